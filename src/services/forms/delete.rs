use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::FormService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

/// 删除表单模板；已有提交保留各自的表单标题快照
pub async fn delete_form(
    service: &FormService,
    request: &HttpRequest,
    form_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.delete_form(form_id).await {
        Ok(true) => {
            info!("Form {} deleted", form_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("表单删除成功")))
        }
        Ok(false) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::FormNotFound, "表单不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}
