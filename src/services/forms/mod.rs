pub mod create;
pub mod delete;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::forms::requests::CreateFormRequest;
use crate::storage::Storage;

pub struct FormService {
    storage: Option<Arc<dyn Storage>>,
}

impl FormService {
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

    /// 创建表单模板
    pub async fn create_form(
        &self,
        request: &HttpRequest,
        req: CreateFormRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_form(self, request, req).await
    }

    /// 全部表单（教职工）
    pub async fn list_forms(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_forms(self, request).await
    }

    /// 当前用户可填写的表单
    pub async fn list_available_forms(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_available_forms(self, request).await
    }

    /// 删除表单模板
    pub async fn delete_form(&self, request: &HttpRequest, form_id: i64) -> ActixResult<HttpResponse> {
        delete::delete_form(self, request, form_id).await
    }
}
