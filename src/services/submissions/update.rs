use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::SubmissionService;
use crate::errors::{Result, SlipSystemError};
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    requests::SubmissionPatch,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, error_response_with_code};
use crate::storage::Storage;
use crate::utils::validate::validate_email;
use crate::workflow::{self, Actor};

pub async fn update_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    patch: SubmissionPatch,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let max_retries = service.get_config().workflow.max_conflict_retries;

    match transition_submission(
        storage.as_ref(),
        &Actor::from(&user),
        submission_id,
        &patch,
        max_retries,
    )
    .await
    {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "更新成功"))),
        Err(e) => Ok(match &e {
            SlipSystemError::NotFound(_) => {
                error_response_with_code(&e, ErrorCode::SubmissionNotFound)
            }
            SlipSystemError::Authorization(_) => {
                error_response_with_code(&e, ErrorCode::SubmissionForbidden)
            }
            SlipSystemError::Validation(_) => {
                error_response_with_code(&e, ErrorCode::SubmissionInvalid)
            }
            _ => error_response(&e),
        }),
    }
}

/// 读取快照 → 引擎判定 → 条件写入
///
/// 写入冲突时重新读取并重新判定，最多 `max_retries` 次。
/// 若重读后状态已不是最初判定时的状态，直接返回 Conflict，
/// 不会把针对旧状态的决定套用到新状态上。
pub(crate) async fn transition_submission(
    storage: &dyn Storage,
    actor: &Actor,
    submission_id: i64,
    patch: &SubmissionPatch,
    max_retries: u32,
) -> Result<Submission> {
    // 空白邮箱交给引擎拒绝，这里只校验格式
    if let Some(email) = patch.parent_email.as_deref().map(str::trim)
        && !email.is_empty()
    {
        validate_email(email).map_err(SlipSystemError::validation)?;
    }

    let mut decided_from: Option<SubmissionStatus> = None;
    let mut attempt = 0;

    loop {
        let snapshot = storage
            .get_submission_by_id(submission_id)
            .await?
            .ok_or_else(|| {
                SlipSystemError::not_found(format!("submission {submission_id} not found"))
            })?;

        if let Some(from) = decided_from
            && from != snapshot.status
        {
            warn!(
                "Submission {} moved from {} to {} during update by {} {}",
                submission_id, from, snapshot.status, actor.role, actor.id
            );
            return Err(SlipSystemError::conflict(format!(
                "submission {submission_id} changed from '{from}' to '{}' concurrently",
                snapshot.status
            )));
        }
        decided_from = Some(snapshot.status);

        let next = workflow::apply_transition(actor, &snapshot, patch).inspect_err(|e| {
            info!(
                "Transition on submission {} by {} {} rejected: {}",
                submission_id, actor.role, actor.id, e
            );
        })?;

        match storage.commit_submission(snapshot.revision, &next).await {
            Ok(()) => {
                info!(
                    "Submission {} {} -> {} by {} {} (revision {})",
                    submission_id, snapshot.status, next.status, actor.role, actor.id, next.revision
                );
                return Ok(next);
            }
            Err(SlipSystemError::Conflict(msg)) if attempt < max_retries => {
                attempt += 1;
                warn!(
                    "Write conflict on submission {} (attempt {}/{}): {}",
                    submission_id, attempt, max_retries, msg
                );
            }
            Err(e) => {
                if matches!(e, SlipSystemError::Conflict(_)) {
                    warn!(
                        "Giving up on submission {} after {} retries: {}",
                        submission_id, attempt, e
                    );
                }
                return Err(e);
            }
        }
    }
}
