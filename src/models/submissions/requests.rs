use serde::Deserialize;
use ts_rs::TS;

use crate::models::submissions::entities::{FormData, SubmissionStatus};

/// 创建提交请求
///
/// 学生身份信息与表单标题均由服务端填充，不接受客户端传入。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct CreateSubmissionRequest {
    pub form_id: i64,
    #[serde(default)]
    pub form_data: FormData,
    pub parent_email: Option<String>,
    /// 初始状态，缺省为 draft
    pub status: Option<SubmissionStatus>,
}

/// 提交变更（部分更新：缺省字段保持不变，不会被清空）
#[derive(Debug, Clone, Default, PartialEq, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionPatch {
    pub status: Option<SubmissionStatus>,
    pub parent_signature: Option<String>,
    pub admin_comments: Option<String>,
    pub form_data: Option<FormData>,
    pub parent_email: Option<String>,
}

/// 提交列表筛选参数（HTTP 请求）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListParams {
    pub status: Option<SubmissionStatus>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone, Default)]
pub struct SubmissionListQuery {
    pub student_id: Option<i64>,
    pub parent_email: Option<String>,
    /// 为空表示不限状态
    pub statuses: Vec<SubmissionStatus>,
}
