use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FormService;
use crate::models::forms::{entities::Form, responses::FormListResponse};
use crate::models::users::entities::{User, UserRole};
use crate::models::ApiResponse;
use crate::services::{current_user, error_response};

pub async fn list_forms(service: &FormService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.list_forms().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FormListResponse { items },
            "获取表单列表成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_available_forms(
    service: &FormService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let storage = service.get_storage(request);
    match storage.list_forms().await {
        Ok(forms) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FormListResponse {
                items: available_to(&user, forms),
            },
            "获取可用表单成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 学生只能看到向本班开放的表单，其他角色看到全部
pub(crate) fn available_to(user: &User, forms: Vec<Form>) -> Vec<Form> {
    match user.role {
        UserRole::Student => forms
            .into_iter()
            .filter(|form| form.is_offered_to(user.section.as_deref()))
            .collect(),
        UserRole::Parent | UserRole::Faculty => forms,
    }
}
