use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode, users::requests::CreateUserRequest};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_name, validate_password_simple, validate_section,
};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    create_request: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 1. 校验并规范化请求
    let mut create_request = match normalize_registration(create_request) {
        Ok(req) => req,
        Err((code, msg)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg)));
        }
    };

    // 2. 检查邮箱是否已存在
    match storage.get_user_by_email(&create_request.email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RegisterFailed,
                    format!("Register failed: {e}"),
                )),
            );
        }
    }

    // 3. 哈希密码
    create_request.password = match hash_password(&create_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RegisterFailed,
                    format!("密码哈希失败: {e}"),
                )),
            );
        }
    };

    // 4. 创建用户
    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("User {} registered as {}", user.id, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "注册成功")))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("注册失败: {e}"),
            )),
        ),
    }
}

/// 校验注册信息；班级与学号只对学生保留，且学生必须填写班级
pub(crate) fn normalize_registration(
    mut req: CreateUserRequest,
) -> Result<CreateUserRequest, (ErrorCode, String)> {
    req.email = req.email.trim().to_lowercase();
    req.name = req.name.trim().to_string();

    validate_email(&req.email).map_err(|msg| (ErrorCode::UserEmailInvalid, msg.to_string()))?;
    validate_name(&req.name).map_err(|msg| (ErrorCode::UserNameInvalid, msg.to_string()))?;
    validate_password_simple(&req.password).map_err(|msg| (ErrorCode::UserPasswordInvalid, msg))?;

    if req.role == UserRole::Student {
        let section = req
            .section
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or((ErrorCode::BadRequest, "Students must provide a section".to_string()))?;
        validate_section(section).map_err(|msg| (ErrorCode::BadRequest, msg.to_string()))?;
        req.section = Some(section.to_string());
        req.roll_number = req
            .roll_number
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
    } else {
        req.section = None;
        req.roll_number = None;
    }

    Ok(req)
}
