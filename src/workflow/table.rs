use serde::Serialize;
use ts_rs::TS;

use crate::models::submissions::entities::{Submission, SubmissionStatus};
use crate::models::users::entities::UserRole;

use super::Actor;

/// 变更中可出现的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchField {
    Status,
    ParentSignature,
    AdminComments,
    FormData,
    ParentEmail,
}

impl PatchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchField::Status => "status",
            PatchField::ParentSignature => "parent_signature",
            PatchField::AdminComments => "admin_comments",
            PatchField::FormData => "form_data",
            PatchField::ParentEmail => "parent_email",
        }
    }
}

impl std::fmt::Display for PatchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 状态转换表中的一行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// 操作名，供前端渲染按钮
    pub action: &'static str,
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
    pub actor: UserRole,
    /// 必须出现且非空的字段
    pub required: &'static [PatchField],
    /// 该操作者在此转换中允许写入的全部字段
    pub writable: &'static [PatchField],
}

impl TransitionRule {
    /// 操作者是否为该提交的相关方：学生须是提交者，家长须是收件人
    pub fn is_party(&self, actor: &Actor, snapshot: &Submission) -> bool {
        match self.actor {
            UserRole::Student => snapshot.student_id == actor.id,
            UserRole::Parent => snapshot
                .parent_email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(&actor.email)),
            UserRole::Faculty => true,
        }
    }

    /// 选填字段（可写但非必填，不含 status）
    pub fn optional_fields(&self) -> impl Iterator<Item = PatchField> + '_ {
        self.writable
            .iter()
            .copied()
            .filter(|f| *f != PatchField::Status && !self.required.contains(f))
    }
}

/// 全部合法转换。不在表中的 (from, to, role) 组合一律视为非法转换。
///
/// `rejected → approved` 存在而 `approved → rejected`、`rejected → sent_to_parent`
/// 不存在，这一不对称与现有行为保持一致。
pub static TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        action: "sign",
        from: SubmissionStatus::SentToParent,
        to: SubmissionStatus::SentToAdmin,
        actor: UserRole::Parent,
        required: &[PatchField::ParentSignature],
        writable: &[PatchField::Status, PatchField::ParentSignature],
    },
    TransitionRule {
        action: "approve",
        from: SubmissionStatus::SentToAdmin,
        to: SubmissionStatus::Approved,
        actor: UserRole::Faculty,
        required: &[],
        writable: &[PatchField::Status, PatchField::AdminComments],
    },
    TransitionRule {
        action: "reject",
        from: SubmissionStatus::SentToAdmin,
        to: SubmissionStatus::Rejected,
        actor: UserRole::Faculty,
        required: &[],
        writable: &[PatchField::Status, PatchField::AdminComments],
    },
    TransitionRule {
        action: "override_approve",
        from: SubmissionStatus::Rejected,
        to: SubmissionStatus::Approved,
        actor: UserRole::Faculty,
        required: &[],
        writable: &[PatchField::Status, PatchField::AdminComments],
    },
    TransitionRule {
        action: "edit_draft",
        from: SubmissionStatus::Draft,
        to: SubmissionStatus::Draft,
        actor: UserRole::Student,
        required: &[],
        writable: &[
            PatchField::Status,
            PatchField::FormData,
            PatchField::ParentEmail,
        ],
    },
];

/// 按 (from, to, role) 查找转换规则
pub fn find_rule(
    from: SubmissionStatus,
    to: SubmissionStatus,
    role: UserRole,
) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && rule.to == to && rule.actor == role)
}

/// 对当前操作者可用的操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct LegalAction {
    pub action: String,
    pub to: SubmissionStatus,
    pub required_fields: Vec<String>,
    pub optional_fields: Vec<String>,
}

impl From<&TransitionRule> for LegalAction {
    fn from(rule: &TransitionRule) -> Self {
        Self {
            action: rule.action.to_string(),
            to: rule.to,
            required_fields: rule.required.iter().map(|f| f.to_string()).collect(),
            optional_fields: rule.optional_fields().map(|f| f.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_keys_are_unique() {
        for (i, a) in TRANSITIONS.iter().enumerate() {
            for b in TRANSITIONS.iter().skip(i + 1) {
                assert!(
                    !(a.from == b.from && a.to == b.to && a.actor == b.actor),
                    "duplicate rule for {} -> {} by {}",
                    a.from,
                    a.to,
                    a.actor
                );
            }
        }
    }

    #[test]
    fn test_every_rule_may_write_its_required_fields() {
        for rule in TRANSITIONS {
            assert!(rule.writable.contains(&PatchField::Status));
            for field in rule.required {
                assert!(rule.writable.contains(field), "{} in {}", field, rule.action);
            }
        }
    }

    #[test]
    fn test_no_reversal_out_of_approved() {
        assert!(
            TRANSITIONS
                .iter()
                .all(|rule| rule.from != SubmissionStatus::Approved)
        );
        assert!(
            find_rule(
                SubmissionStatus::Rejected,
                SubmissionStatus::SentToParent,
                UserRole::Faculty
            )
            .is_none()
        );
    }

    #[test]
    fn test_legal_action_lists_fields() {
        let rule = find_rule(
            SubmissionStatus::SentToAdmin,
            SubmissionStatus::Approved,
            UserRole::Faculty,
        )
        .unwrap();
        let action = LegalAction::from(rule);
        assert_eq!(action.action, "approve");
        assert!(action.required_fields.is_empty());
        assert_eq!(action.optional_fields, vec!["admin_comments".to_string()]);
    }
}
