pub mod auth;
pub mod forms;
pub mod submissions;

pub use auth::AuthService;
pub use forms::FormService;
pub use submissions::SubmissionService;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode};
use tracing::error;

use crate::errors::SlipSystemError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 错误类型对应的 HTTP 状态码
pub(crate) fn status_for(err: &SlipSystemError) -> StatusCode {
    match err {
        SlipSystemError::Validation(_) => StatusCode::BAD_REQUEST,
        SlipSystemError::Authentication(_) => StatusCode::UNAUTHORIZED,
        SlipSystemError::Authorization(_) => StatusCode::FORBIDDEN,
        SlipSystemError::NotFound(_) => StatusCode::NOT_FOUND,
        SlipSystemError::IllegalTransition(_) | SlipSystemError::Conflict(_) => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 错误类型对应的默认业务错误码
pub(crate) fn code_for(err: &SlipSystemError) -> ErrorCode {
    match err {
        SlipSystemError::Validation(_) => ErrorCode::BadRequest,
        SlipSystemError::Authentication(_) => ErrorCode::Unauthorized,
        SlipSystemError::Authorization(_) => ErrorCode::Forbidden,
        SlipSystemError::NotFound(_) => ErrorCode::NotFound,
        SlipSystemError::IllegalTransition(_) => ErrorCode::IllegalTransition,
        SlipSystemError::Conflict(_) => ErrorCode::SubmissionConflict,
        _ => ErrorCode::InternalServerError,
    }
}

pub(crate) fn error_response(err: &SlipSystemError) -> HttpResponse {
    error_response_with_code(err, code_for(err))
}

pub(crate) fn error_response_with_code(err: &SlipSystemError, code: ErrorCode) -> HttpResponse {
    if !err.is_workflow_error() && status_for(err).is_server_error() {
        error!("[{}] {}: {}", err.code(), err.error_type(), err.message());
    }
    HttpResponse::build(status_for(err)).json(ApiResponse::error_empty(code, err.message()))
}

/// 取出 RequireJWT 放入的当前用户
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录"))
    })
}
