use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 表单答案：字段名 → 值
pub type FormData = BTreeMap<String, serde_json::Value>;

/// 提交状态（审批流程中唯一的状态机）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatus {
    Draft,        // 草稿，仅学生可编辑
    SentToParent, // 等待家长签字
    SentToAdmin,  // 等待教职工审批
    Approved,     // 已批准
    Rejected,     // 已驳回
}

impl SubmissionStatus {
    pub const DRAFT: &'static str = "draft";
    pub const SENT_TO_PARENT: &'static str = "sent_to_parent";
    pub const SENT_TO_ADMIN: &'static str = "sent_to_admin";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";

    pub fn all() -> &'static [SubmissionStatus] {
        &[
            Self::Draft,
            Self::SentToParent,
            Self::SentToAdmin,
            Self::Approved,
            Self::Rejected,
        ]
    }

    /// 学生创建提交时允许的初始状态
    pub fn initial_states() -> &'static [SubmissionStatus] {
        &[Self::Draft, Self::SentToParent]
    }

    /// 家长可见的状态（已离开草稿）
    pub fn parent_visible() -> &'static [SubmissionStatus] {
        &[
            Self::SentToParent,
            Self::SentToAdmin,
            Self::Approved,
            Self::Rejected,
        ]
    }

    /// 教职工可见的状态（家长已签字）
    pub fn faculty_visible() -> &'static [SubmissionStatus] {
        &[Self::SentToAdmin, Self::Approved, Self::Rejected]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => Self::DRAFT,
            SubmissionStatus::SentToParent => Self::SENT_TO_PARENT,
            SubmissionStatus::SentToAdmin => Self::SENT_TO_ADMIN,
            SubmissionStatus::Approved => Self::APPROVED,
            SubmissionStatus::Rejected => Self::REJECTED,
        }
    }
}

impl<'de> Deserialize<'de> for SubmissionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<SubmissionStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的提交状态: '{s}'. 支持的状态: draft, sent_to_parent, sent_to_admin, approved, rejected"
            ))
        })
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::DRAFT => Ok(SubmissionStatus::Draft),
            Self::SENT_TO_PARENT => Ok(SubmissionStatus::SentToParent),
            Self::SENT_TO_ADMIN => Ok(SubmissionStatus::SentToAdmin),
            Self::APPROVED => Ok(SubmissionStatus::Approved),
            Self::REJECTED => Ok(SubmissionStatus::Rejected),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

/// 提交记录
///
/// 既是状态容器也是审计记录：不另存历史，当前状态即唯一状态。
/// `revision` 为乐观并发令牌，每次被接受的变更加一。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub form_id: i64,
    pub form_title: String,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub student_section: Option<String>,
    pub student_roll_number: Option<String>,
    pub form_data: FormData,
    pub parent_email: Option<String>,
    pub status: SubmissionStatus,
    pub parent_signature: Option<String>,
    pub admin_comments: Option<String>,
    pub revision: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 待插入的新提交（尚未分配 id）
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub form_id: i64,
    pub form_title: String,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub student_section: Option<String>,
    pub student_roll_number: Option<String>,
    pub form_data: FormData,
    pub parent_email: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_forms_match_wire_names() {
        for status in SubmissionStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: SubmissionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(&back, status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!("archived".parse::<SubmissionStatus>().is_err());
        assert!(serde_json::from_str::<SubmissionStatus>("\"pending\"").is_err());
    }
}
