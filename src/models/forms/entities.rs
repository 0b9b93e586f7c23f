use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 表单字段定义（字段类型由前端解释，服务端不做约束）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/form.ts")]
pub struct FormField {
    pub field_name: String,
    pub field_type: String,
}

/// 表单模板
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/form.ts")]
pub struct Form {
    pub id: i64,
    pub title: String,
    pub fields: Vec<FormField>,
    /// 可填写该表单的班级
    pub sections: Vec<String>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Form {
    /// 该表单是否向指定班级开放
    pub fn is_offered_to(&self, section: Option<&str>) -> bool {
        match section {
            Some(section) => self.sections.iter().any(|s| s == section),
            None => false,
        }
    }
}
