pub mod create;
pub mod detail;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::submissions::requests::{
    CreateSubmissionRequest, SubmissionListParams, SubmissionPatch,
};
use crate::storage::Storage;

pub use list::ListView;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    /// 学生创建提交
    pub async fn create_submission(
        &self,
        request: &HttpRequest,
        req: CreateSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, request, req).await
    }

    /// 按角色视图列出提交
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        view: ListView,
        params: SubmissionListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_submissions(self, request, view, params).await
    }

    /// 获取提交详情
    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, submission_id).await
    }

    /// 当前用户可执行的操作
    pub async fn get_actions(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_actions(self, request, submission_id).await
    }

    /// 应用变更（状态转换或字段编辑）
    pub async fn update_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        patch: SubmissionPatch,
    ) -> ActixResult<HttpResponse> {
        update::update_submission(self, request, submission_id, patch).await
    }
}
