use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::submissions::requests::{
    CreateSubmissionRequest, SubmissionListParams, SubmissionPatch,
};
use crate::models::users::entities::UserRole;
use crate::services::SubmissionService;
use crate::services::submissions::ListView;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// 创建提交
pub async fn create_submission(
    req: HttpRequest,
    body: web::Json<CreateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .create_submission(&req, body.into_inner())
        .await
}

// 学生：我的提交
pub async fn list_student_submissions(
    req: HttpRequest,
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_submissions(&req, ListView::Student, query.into_inner())
        .await
}

// 家长：发给我的提交
pub async fn list_parent_submissions(
    req: HttpRequest,
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_submissions(&req, ListView::Parent, query.into_inner())
        .await
}

// 教职工：待审批与已处理的提交
pub async fn list_faculty_submissions(
    req: HttpRequest,
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_submissions(&req, ListView::Faculty, query.into_inner())
        .await
}

// 获取提交详情
pub async fn get_submission(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .get_submission(&req, path.into_inner())
        .await
}

// 状态转换或草稿编辑
pub async fn update_submission(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SubmissionPatch>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .update_submission(&req, path.into_inner(), body.into_inner())
        .await
}

// 当前用户可执行的操作
pub async fn get_submission_actions(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .get_actions(&req, path.into_inner())
        .await
}

// 配置路由
pub fn configure_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(middlewares::RequireJWT)
            // 创建提交 - 仅学生
            .service(
                web::resource("")
                    .wrap(middlewares::RateLimit::submission_write())
                    .wrap(middlewares::RequireRole::new(&UserRole::Student))
                    .route(web::post().to(create_submission)),
            )
            .service(
                web::resource("/student")
                    .wrap(middlewares::RequireRole::new(&UserRole::Student))
                    .route(web::get().to(list_student_submissions)),
            )
            .service(
                web::resource("/parent")
                    .wrap(middlewares::RequireRole::new(&UserRole::Parent))
                    .route(web::get().to(list_parent_submissions)),
            )
            .service(
                web::resource("/faculty")
                    .wrap(middlewares::RequireRole::new(&UserRole::Faculty))
                    .route(web::get().to(list_faculty_submissions)),
            )
            // 详情与变更 - 所有登录用户可访问（归属与状态由审批引擎校验）
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_submission))
                    .route(
                        web::put()
                            .to(update_submission)
                            .wrap(middlewares::RateLimit::submission_write()),
                    ),
            )
            .service(
                web::resource("/{id}/actions").route(web::get().to(get_submission_actions)),
            ),
    );
}
