use serde::Deserialize;
use ts_rs::TS;

use crate::models::forms::entities::FormField;

/// 创建表单模板请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/form.ts")]
pub struct CreateFormRequest {
    pub title: String,
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub sections: Vec<String>,
}
