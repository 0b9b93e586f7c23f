use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubmissionService;
use crate::errors::SlipSystemError;
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    requests::CreateSubmissionRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{code_for, current_user, error_response_with_code};
use crate::storage::Storage;
use crate::utils::validate::validate_email;
use crate::workflow::{self, Actor, FormRef};

pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    req: CreateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match create_for_student(storage.as_ref(), &user, req).await {
        Ok(submission) => Ok(HttpResponse::Created().json(ApiResponse::success(
            submission,
            "提交创建成功",
        ))),
        Err((code, e)) => {
            info!("Submission creation by user {} rejected: {}", user.id, e);
            Ok(error_response_with_code(&e, code))
        }
    }
}

/// 创建失败时的业务错误码与错误
pub(crate) type CreateError = (ErrorCode, SlipSystemError);

fn with_code(code: ErrorCode) -> impl FnOnce(SlipSystemError) -> CreateError {
    move |e| (code, e)
}

// 引擎拒绝创建时的业务错误码
fn engine_code(err: &SlipSystemError) -> ErrorCode {
    match err {
        SlipSystemError::Authorization(_) => ErrorCode::SubmissionForbidden,
        SlipSystemError::Validation(_) => ErrorCode::SubmissionInvalid,
        _ => code_for(err),
    }
}

/// 加载表单并交由审批引擎生成新提交
///
/// 表单标题取自存储；学生只能填写向本班开放的表单。
pub(crate) async fn create_for_student(
    storage: &dyn Storage,
    user: &User,
    req: CreateSubmissionRequest,
) -> std::result::Result<Submission, CreateError> {
    let form = storage
        .get_form_by_id(req.form_id)
        .await
        .map_err(|e| (code_for(&e), e))?
        .ok_or_else(|| {
            (
                ErrorCode::FormNotFound,
                SlipSystemError::not_found(format!("form {} not found", req.form_id)),
            )
        })?;

    if user.role == UserRole::Student && !form.is_offered_to(user.section.as_deref()) {
        return Err((
            ErrorCode::FormNotAvailable,
            SlipSystemError::authorization(format!(
                "form {} is not offered to section {}",
                form.id,
                user.section.as_deref().unwrap_or("(none)")
            )),
        ));
    }

    if let Some(email) = req.parent_email.as_deref().map(str::trim)
        && !email.is_empty()
    {
        validate_email(email)
            .map_err(SlipSystemError::validation)
            .map_err(with_code(ErrorCode::SubmissionInvalid))?;
    }

    let new = workflow::create_submission(
        &Actor::from(user),
        &FormRef::from(&form),
        req.form_data,
        req.status.unwrap_or(SubmissionStatus::Draft),
        req.parent_email,
    )
    .map_err(|e| (engine_code(&e), e))?;

    let submission = storage
        .create_submission(new)
        .await
        .map_err(|e| (code_for(&e), e))?;
    info!(
        "Submission {} created by student {} in status {}",
        submission.id, user.id, submission.status
    );
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forms::{entities::FormField, requests::CreateFormRequest};
    use crate::storage::sea_orm_storage::test_support::{memory_storage, seed_user};
    use serde_json::json;

    async fn setup() -> (crate::storage::sea_orm_storage::SeaOrmStorage, User, i64) {
        let storage = memory_storage().await;
        let faculty = seed_user(&storage, "lee@school.test", UserRole::Faculty, None).await;
        let student = seed_user(&storage, "sam@school.test", UserRole::Student, Some("A")).await;
        let form = storage
            .create_form(
                CreateFormRequest {
                    title: "Museum trip".to_string(),
                    fields: vec![FormField {
                        field_name: "lunch".to_string(),
                        field_type: "checkbox".to_string(),
                    }],
                    sections: vec!["A".to_string()],
                },
                faculty.id,
            )
            .await
            .unwrap();
        (storage, student, form.id)
    }

    fn request(form_id: i64, status: Option<SubmissionStatus>, parent: Option<&str>) -> CreateSubmissionRequest {
        let mut form_data = crate::models::submissions::entities::FormData::new();
        form_data.insert("lunch".to_string(), json!(true));
        CreateSubmissionRequest {
            form_id,
            form_data,
            parent_email: parent.map(str::to_string),
            status,
        }
    }

    #[tokio::test]
    async fn test_student_creates_draft_with_form_title_from_storage() {
        let (storage, student, form_id) = setup().await;
        let created = create_for_student(&storage, &student, request(form_id, None, None))
            .await
            .unwrap();
        assert_eq!(created.status, SubmissionStatus::Draft);
        assert_eq!(created.form_title, "Museum trip");
        assert_eq!(created.student_id, student.id);
        assert_eq!(created.student_section.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_send_to_parent_without_email_is_validation_error() {
        let (storage, student, form_id) = setup().await;
        let result = create_for_student(
            &storage,
            &student,
            request(form_id, Some(SubmissionStatus::SentToParent), None),
        )
        .await;
        assert!(matches!(result, Err((ErrorCode::SubmissionInvalid, SlipSystemError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_malformed_parent_email_is_validation_error() {
        let (storage, student, form_id) = setup().await;
        let result = create_for_student(
            &storage,
            &student,
            request(form_id, Some(SubmissionStatus::SentToParent), Some("not-an-email")),
        )
        .await;
        assert!(matches!(result, Err((ErrorCode::SubmissionInvalid, SlipSystemError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_form_for_other_section_is_forbidden() {
        let (storage, _, form_id) = setup().await;
        let other = seed_user(&storage, "kim@school.test", UserRole::Student, Some("B")).await;
        let result = create_for_student(&storage, &other, request(form_id, None, None)).await;
        assert!(matches!(
            result,
            Err((ErrorCode::FormNotAvailable, SlipSystemError::Authorization(_)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_form_is_not_found() {
        let (storage, student, _) = setup().await;
        let result = create_for_student(&storage, &student, request(999, None, None)).await;
        assert!(matches!(result, Err((ErrorCode::FormNotFound, SlipSystemError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_parent_cannot_create() {
        let (storage, _, form_id) = setup().await;
        let parent = seed_user(&storage, "jane@home.test", UserRole::Parent, None).await;
        let result = create_for_student(&storage, &parent, request(form_id, None, None)).await;
        // 非学生被引擎拒绝，不应报告为表单不可用
        assert!(matches!(
            result,
            Err((ErrorCode::SubmissionForbidden, SlipSystemError::Authorization(_)))
        ));
    }
}
