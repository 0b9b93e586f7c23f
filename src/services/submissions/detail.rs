use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::{Result, SlipSystemError};
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    responses::SubmissionActionsResponse,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, error_response_with_code};
use crate::storage::Storage;
use crate::workflow::{self, Actor};

pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match load_readable(storage.as_ref(), &user, submission_id).await {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "查询成功"))),
        Err(e) => Ok(read_error_response(&e)),
    }
}

pub async fn get_actions(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match load_readable(storage.as_ref(), &user, submission_id).await {
        Ok(submission) => {
            let actions = workflow::legal_actions(&Actor::from(&user), &submission);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubmissionActionsResponse {
                    submission_id: submission.id,
                    status: submission.status,
                    actions,
                },
                "查询成功",
            )))
        }
        Err(e) => Ok(read_error_response(&e)),
    }
}

fn read_error_response(err: &SlipSystemError) -> HttpResponse {
    match err {
        SlipSystemError::NotFound(_) => error_response_with_code(err, ErrorCode::SubmissionNotFound),
        SlipSystemError::Authorization(_) => {
            error_response_with_code(err, ErrorCode::SubmissionForbidden)
        }
        _ => error_response(err),
    }
}

/// 读取权限：学生看自己的，家长看发给自己且已离开草稿的，教职工看家长已签字的
pub(crate) fn can_read(user: &User, submission: &Submission) -> bool {
    match user.role {
        UserRole::Student => submission.student_id == user.id,
        UserRole::Parent => {
            SubmissionStatus::parent_visible().contains(&submission.status)
                && submission
                    .parent_email
                    .as_deref()
                    .is_some_and(|email| email.eq_ignore_ascii_case(&user.email))
        }
        UserRole::Faculty => SubmissionStatus::faculty_visible().contains(&submission.status),
    }
}

/// 加载提交并校验读取权限
pub(crate) async fn load_readable(
    storage: &dyn Storage,
    user: &User,
    submission_id: i64,
) -> Result<Submission> {
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| {
            SlipSystemError::not_found(format!("submission {submission_id} not found"))
        })?;

    if !can_read(user, &submission) {
        return Err(SlipSystemError::authorization(format!(
            "user {} cannot view submission {submission_id}",
            user.id
        )));
    }
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::FormData;

    fn user(id: i64, role: UserRole, email: &str) -> User {
        User {
            id,
            email: email.to_string(),
            password_hash: String::new(),
            role,
            name: "Someone".to_string(),
            section: None,
            roll_number: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn submission(status: SubmissionStatus) -> Submission {
        Submission {
            id: 1,
            form_id: 1,
            form_title: "Museum trip".to_string(),
            student_id: 7,
            student_name: "Sam".to_string(),
            student_email: "sam@school.test".to_string(),
            student_section: Some("A".to_string()),
            student_roll_number: Some("12".to_string()),
            form_data: FormData::new(),
            parent_email: Some("jane@home.test".to_string()),
            status,
            parent_signature: None,
            admin_comments: None,
            revision: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_student_reads_only_own() {
        let sub = submission(SubmissionStatus::Draft);
        assert!(can_read(&user(7, UserRole::Student, "sam@school.test"), &sub));
        assert!(!can_read(&user(8, UserRole::Student, "kim@school.test"), &sub));
    }

    #[test]
    fn test_parent_reads_addressed_after_draft() {
        let jane = user(3, UserRole::Parent, "Jane@Home.test");
        assert!(!can_read(&jane, &submission(SubmissionStatus::Draft)));
        assert!(can_read(&jane, &submission(SubmissionStatus::SentToParent)));
        assert!(can_read(&jane, &submission(SubmissionStatus::Approved)));
        let other = user(4, UserRole::Parent, "other@home.test");
        assert!(!can_read(&other, &submission(SubmissionStatus::SentToParent)));
    }

    #[test]
    fn test_faculty_reads_after_parent_signed() {
        let lee = user(1, UserRole::Faculty, "lee@school.test");
        assert!(!can_read(&lee, &submission(SubmissionStatus::Draft)));
        assert!(!can_read(&lee, &submission(SubmissionStatus::SentToParent)));
        assert!(can_read(&lee, &submission(SubmissionStatus::SentToAdmin)));
        assert!(can_read(&lee, &submission(SubmissionStatus::Rejected)));
    }
}
