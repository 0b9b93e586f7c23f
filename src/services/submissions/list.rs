use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::{Result, SlipSystemError};
use crate::models::submissions::{
    entities::SubmissionStatus,
    requests::{SubmissionListParams, SubmissionListQuery},
    responses::SubmissionListResponse,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

/// 列表视图，与路由一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    /// 学生自己的全部提交
    Student,
    /// 发给当前家长且已离开草稿的提交
    Parent,
    /// 家长已签字后的全部提交
    Faculty,
}

impl ListView {
    fn role(&self) -> UserRole {
        match self {
            ListView::Student => UserRole::Student,
            ListView::Parent => UserRole::Parent,
            ListView::Faculty => UserRole::Faculty,
        }
    }

    fn visible_statuses(&self) -> &'static [SubmissionStatus] {
        match self {
            ListView::Student => SubmissionStatus::all(),
            ListView::Parent => SubmissionStatus::parent_visible(),
            ListView::Faculty => SubmissionStatus::faculty_visible(),
        }
    }
}

pub async fn list_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    view: ListView,
    params: SubmissionListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    let query = match list_query_for(&user, view, params.status) {
        Ok(query) => query,
        Err(e) => return Ok(error_response(&e)),
    };

    let storage = service.get_storage(request);
    match storage.list_submissions(query).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("查询提交列表失败: {e}"),
        ))),
    }
}

/// 把视图与当前用户翻译为存储查询
///
/// 状态筛选只能收窄视图，不能越过视图的可见范围。
pub(crate) fn list_query_for(
    user: &User,
    view: ListView,
    status: Option<SubmissionStatus>,
) -> Result<SubmissionListQuery> {
    if user.role != view.role() {
        return Err(SlipSystemError::authorization(format!(
            "role '{}' cannot use the {} list",
            user.role,
            view.role()
        )));
    }

    let visible = view.visible_statuses();
    let statuses = match status {
        Some(status) if visible.contains(&status) => vec![status],
        Some(status) => {
            return Err(SlipSystemError::validation(format!(
                "status '{status}' is not visible to {}",
                view.role()
            )));
        }
        None if view == ListView::Student => Vec::new(),
        None => visible.to_vec(),
    };

    let mut query = SubmissionListQuery {
        statuses,
        ..Default::default()
    };
    match view {
        ListView::Student => query.student_id = Some(user.id),
        ListView::Parent => query.parent_email = Some(user.email.clone()),
        ListView::Faculty => {}
    }
    Ok(query)
}
