use serde::Serialize;
use ts_rs::TS;

use crate::models::forms::entities::Form;

/// 表单列表响应（按创建时间倒序）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/form.ts")]
pub struct FormListResponse {
    pub items: Vec<Form>,
}
