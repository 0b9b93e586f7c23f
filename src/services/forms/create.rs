use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::FormService;
use crate::models::forms::requests::CreateFormRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};
use crate::utils::validate::{validate_form_title, validate_section};

pub async fn create_form(
    service: &FormService,
    request: &HttpRequest,
    req: CreateFormRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let req = match normalize_form(req) {
        Ok(req) => req,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::FormInvalid, msg)));
        }
    };

    let storage = service.get_storage(request);
    match storage.create_form(req, user.id).await {
        Ok(form) => {
            info!("Form {} created by faculty {}", form.id, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(form, "表单创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

/// 标题与字段名不能为空，字段名不能重复；班级去重
pub(crate) fn normalize_form(mut req: CreateFormRequest) -> Result<CreateFormRequest, String> {
    req.title = req.title.trim().to_string();
    validate_form_title(&req.title)?;

    if req.fields.is_empty() {
        return Err("A form needs at least one field".to_string());
    }

    let mut seen = std::collections::HashSet::new();
    for field in &mut req.fields {
        field.field_name = field.field_name.trim().to_string();
        field.field_type = field.field_type.trim().to_string();
        if field.field_name.is_empty() || field.field_type.is_empty() {
            return Err("Field name and type cannot be empty".to_string());
        }
        if !seen.insert(field.field_name.clone()) {
            return Err(format!("Duplicate field name: {}", field.field_name));
        }
    }

    let mut sections: Vec<String> = Vec::with_capacity(req.sections.len());
    for section in req.sections.iter().map(|s| s.trim()) {
        validate_section(section)?;
        if !sections.iter().any(|s| s == section) {
            sections.push(section.to_string());
        }
    }
    req.sections = sections;

    Ok(req)
}
