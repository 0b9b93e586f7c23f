use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::forms::requests::CreateFormRequest;
use crate::models::users::entities::UserRole;
use crate::services::FormService;

// 懒加载的全局 FormService 实例
static FORM_SERVICE: Lazy<FormService> = Lazy::new(FormService::new_lazy);

// 创建表单
pub async fn create_form(
    req: HttpRequest,
    body: web::Json<CreateFormRequest>,
) -> ActixResult<HttpResponse> {
    FORM_SERVICE.create_form(&req, body.into_inner()).await
}

// 列出全部表单
pub async fn list_forms(req: HttpRequest) -> ActixResult<HttpResponse> {
    FORM_SERVICE.list_forms(&req).await
}

// 当前用户可填写的表单
pub async fn list_available_forms(req: HttpRequest) -> ActixResult<HttpResponse> {
    FORM_SERVICE.list_available_forms(&req).await
}

// 删除表单
pub async fn delete_form(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    FORM_SERVICE.delete_form(&req, path.into_inner()).await
}

// 配置路由
pub fn configure_forms_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/forms")
            .wrap(middlewares::RequireJWT)
            // 所有登录用户可访问（业务层按班级过滤）
            .service(web::resource("/available").route(web::get().to(list_available_forms)))
            .service(
                web::resource("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles()))
                    .route(web::get().to(list_forms))
                    .route(web::post().to(create_form)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles()))
                    .route(web::delete().to(delete_form)),
            ),
    );
}
