use serde::Serialize;
use ts_rs::TS;

use crate::models::submissions::entities::{Submission, SubmissionStatus};
use crate::workflow::LegalAction;

/// 提交列表响应（按创建时间倒序，无分页）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListResponse {
    pub items: Vec<Submission>,
}

/// 当前用户在该提交上可执行的操作
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionActionsResponse {
    pub submission_id: i64,
    pub status: SubmissionStatus,
    pub actions: Vec<LegalAction>,
}
