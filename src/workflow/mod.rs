//! 审批流程引擎
//!
//! 提交状态机的唯一权威实现：给定快照、变更与操作者，判断变更是否合法并计算新记录。
//! 引擎是纯函数，不做任何 I/O，也不持有共享状态；
//! 读取快照、条件写入与冲突重试由存储层和服务层负责。
//!
//! ```text
//!   draft ──(student edit)──▶ draft
//!   sent_to_parent ──(parent signs)──▶ sent_to_admin
//!   sent_to_admin ──(faculty)──▶ approved | rejected
//!   rejected ──(faculty override)──▶ approved
//! ```

mod actor;
mod engine;
mod table;

pub use actor::{Actor, FormRef};
pub use engine::{
    apply_transition, apply_transition_at, create_submission, create_submission_at, legal_actions,
};
pub use table::{LegalAction, PatchField, TRANSITIONS, TransitionRule, find_rule};
