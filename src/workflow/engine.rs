use chrono::{DateTime, SubsecRound, Utc};

use crate::errors::{Result, SlipSystemError};
use crate::models::submissions::entities::{
    FormData, NewSubmission, Submission, SubmissionStatus,
};
use crate::models::submissions::requests::SubmissionPatch;
use crate::models::users::entities::UserRole;

use super::table::{LegalAction, PatchField, TRANSITIONS, TransitionRule, find_rule};
use super::{Actor, FormRef};

/// 学生创建提交
pub fn create_submission(
    actor: &Actor,
    form: &FormRef,
    form_data: FormData,
    target: SubmissionStatus,
    parent_email: Option<String>,
) -> Result<NewSubmission> {
    create_submission_at(actor, form, form_data, target, parent_email, Utc::now())
}

/// 同 [`create_submission`]，使用给定时间戳
pub fn create_submission_at(
    actor: &Actor,
    form: &FormRef,
    form_data: FormData,
    target: SubmissionStatus,
    parent_email: Option<String>,
    now: DateTime<Utc>,
) -> Result<NewSubmission> {
    if actor.role != UserRole::Student {
        return Err(SlipSystemError::authorization(format!(
            "only students can create submissions, actor role is '{}'",
            actor.role
        )));
    }

    if !SubmissionStatus::initial_states().contains(&target) {
        return Err(SlipSystemError::validation(format!(
            "initial status must be 'draft' or 'sent_to_parent', got '{target}'"
        )));
    }

    let parent_email = parent_email
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty());

    if target == SubmissionStatus::SentToParent && parent_email.is_none() {
        return Err(SlipSystemError::validation(
            "parent_email is required when sending a submission to a parent",
        ));
    }

    // 学生信息一律取自操作者身份，家长邮箱统一小写存储
    Ok(NewSubmission {
        form_id: form.id,
        form_title: form.title.clone(),
        student_id: actor.id,
        student_name: actor.name.clone(),
        student_email: actor.email.clone(),
        student_section: actor.section.clone(),
        student_roll_number: actor.roll_number.clone(),
        form_data,
        parent_email,
        status: target,
        created_at: now.trunc_subsecs(0),
    })
}

/// 对快照应用变更，返回新记录；快照本身不被修改
pub fn apply_transition(
    actor: &Actor,
    snapshot: &Submission,
    patch: &SubmissionPatch,
) -> Result<Submission> {
    apply_transition_at(actor, snapshot, patch, Utc::now())
}

/// 同 [`apply_transition`]，使用给定时间戳
pub fn apply_transition_at(
    actor: &Actor,
    snapshot: &Submission,
    patch: &SubmissionPatch,
    now: DateTime<Utc>,
) -> Result<Submission> {
    let from = snapshot.status;
    let to = patch.status.unwrap_or(from);

    let rule = find_rule(from, to, actor.role).ok_or_else(|| {
        SlipSystemError::illegal_transition(format!(
            "cannot move submission {} from '{from}' to '{to}' as {}",
            snapshot.id, actor.role
        ))
    })?;

    if !rule.is_party(actor, snapshot) {
        return Err(SlipSystemError::authorization(not_a_party_message(
            rule, actor, snapshot,
        )));
    }

    for field in present_fields(patch) {
        if !rule.writable.contains(&field) {
            return Err(SlipSystemError::authorization(format!(
                "{} may not set '{field}' when moving submission from '{from}' to '{to}'",
                actor.role
            )));
        }
    }

    for field in rule.required {
        if !has_value(patch, *field) {
            return Err(SlipSystemError::validation(format!(
                "'{field}' is required to move submission from '{from}' to '{to}'"
            )));
        }
    }

    if patch
        .parent_email
        .as_deref()
        .is_some_and(|email| email.trim().is_empty())
    {
        return Err(SlipSystemError::validation("parent_email cannot be blank"));
    }

    // 全部校验通过后才构造新记录
    let mut next = snapshot.clone();
    if let Some(signature) = &patch.parent_signature {
        next.parent_signature = Some(signature.trim().to_string());
    }
    if let Some(comments) = &patch.admin_comments {
        next.admin_comments = Some(comments.clone());
    }
    if let Some(form_data) = &patch.form_data {
        next.form_data = form_data.clone();
    }
    if let Some(email) = &patch.parent_email {
        next.parent_email = Some(email.trim().to_lowercase());
    }
    next.status = to;
    next.revision = snapshot.revision + 1;
    // 存储只保留到秒
    next.updated_at = now.trunc_subsecs(0);

    Ok(next)
}

/// 当前操作者在快照上可执行的操作
pub fn legal_actions(actor: &Actor, snapshot: &Submission) -> Vec<LegalAction> {
    TRANSITIONS
        .iter()
        .filter(|rule| rule.from == snapshot.status && rule.actor == actor.role)
        .filter(|rule| rule.is_party(actor, snapshot))
        .map(LegalAction::from)
        .collect()
}

fn present_fields(patch: &SubmissionPatch) -> Vec<PatchField> {
    let mut fields = Vec::with_capacity(5);
    if patch.status.is_some() {
        fields.push(PatchField::Status);
    }
    if patch.parent_signature.is_some() {
        fields.push(PatchField::ParentSignature);
    }
    if patch.admin_comments.is_some() {
        fields.push(PatchField::AdminComments);
    }
    if patch.form_data.is_some() {
        fields.push(PatchField::FormData);
    }
    if patch.parent_email.is_some() {
        fields.push(PatchField::ParentEmail);
    }
    fields
}

fn has_value(patch: &SubmissionPatch, field: PatchField) -> bool {
    fn non_blank(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    match field {
        PatchField::Status => patch.status.is_some(),
        PatchField::ParentSignature => non_blank(&patch.parent_signature),
        PatchField::AdminComments => non_blank(&patch.admin_comments),
        PatchField::FormData => patch.form_data.is_some(),
        PatchField::ParentEmail => non_blank(&patch.parent_email),
    }
}

fn not_a_party_message(rule: &TransitionRule, actor: &Actor, snapshot: &Submission) -> String {
    match rule.actor {
        UserRole::Student => format!(
            "student {} does not own submission {}",
            actor.id, snapshot.id
        ),
        UserRole::Parent => format!(
            "submission {} is not addressed to parent {}",
            snapshot.id, actor.email
        ),
        UserRole::Faculty => format!("faculty {} cannot act on submission {}", actor.id, snapshot.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn student() -> Actor {
        Actor {
            id: 7,
            role: UserRole::Student,
            email: "sam@school.test".to_string(),
            name: "Sam Student".to_string(),
            section: Some("10-B".to_string()),
            roll_number: Some("42".to_string()),
        }
    }

    fn parent() -> Actor {
        Actor {
            id: 8,
            role: UserRole::Parent,
            email: "jane@home.test".to_string(),
            name: "Jane Doe".to_string(),
            section: None,
            roll_number: None,
        }
    }

    fn faculty() -> Actor {
        Actor {
            id: 9,
            role: UserRole::Faculty,
            email: "ms.lee@school.test".to_string(),
            name: "Ms Lee".to_string(),
            section: None,
            roll_number: None,
        }
    }

    fn form() -> FormRef {
        FormRef {
            id: 3,
            title: "Museum trip".to_string(),
        }
    }

    fn answers() -> FormData {
        let mut data = FormData::new();
        data.insert("destination".to_string(), json!("Science Museum"));
        data.insert("lunch".to_string(), json!(true));
        data
    }

    fn persisted(new: NewSubmission) -> Submission {
        Submission {
            id: 100,
            form_id: new.form_id,
            form_title: new.form_title,
            student_id: new.student_id,
            student_name: new.student_name,
            student_email: new.student_email,
            student_section: new.student_section,
            student_roll_number: new.student_roll_number,
            form_data: new.form_data,
            parent_email: new.parent_email,
            status: new.status,
            parent_signature: None,
            admin_comments: None,
            revision: 0,
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }

    fn snapshot_in(status: SubmissionStatus) -> Submission {
        let mut sub = persisted(
            create_submission_at(
                &student(),
                &form(),
                answers(),
                SubmissionStatus::SentToParent,
                Some("jane@home.test".to_string()),
                ts(1_000),
            )
            .unwrap(),
        );
        sub.status = status;
        if matches!(
            status,
            SubmissionStatus::SentToAdmin | SubmissionStatus::Approved | SubmissionStatus::Rejected
        ) {
            sub.parent_signature = Some("Jane Doe".to_string());
        }
        sub
    }

    fn to(status: SubmissionStatus) -> SubmissionPatch {
        SubmissionPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    fn sign(signature: &str) -> SubmissionPatch {
        SubmissionPatch {
            status: Some(SubmissionStatus::SentToAdmin),
            parent_signature: Some(signature.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_copies_identity_from_actor() {
        let new = create_submission_at(
            &student(),
            &form(),
            answers(),
            SubmissionStatus::Draft,
            None,
            ts(1_000),
        )
        .unwrap();

        assert_eq!(new.status, SubmissionStatus::Draft);
        assert_eq!(new.student_id, 7);
        assert_eq!(new.student_name, "Sam Student");
        assert_eq!(new.student_email, "sam@school.test");
        assert_eq!(new.student_section.as_deref(), Some("10-B"));
        assert_eq!(new.student_roll_number.as_deref(), Some("42"));
        assert_eq!(new.form_title, "Museum trip");
        assert_eq!(new.created_at, ts(1_000));
    }

    #[test]
    fn test_create_only_lands_in_initial_states() {
        for target in SubmissionStatus::all() {
            let result = create_submission_at(
                &student(),
                &form(),
                answers(),
                *target,
                Some("jane@home.test".to_string()),
                ts(1_000),
            );
            match target {
                SubmissionStatus::Draft | SubmissionStatus::SentToParent => {
                    assert_eq!(result.unwrap().status, *target);
                }
                _ => assert!(matches!(result, Err(SlipSystemError::Validation(_)))),
            }
        }
    }

    #[test]
    fn test_create_sent_to_parent_without_email_is_validation_error() {
        for email in [None, Some("".to_string()), Some("   ".to_string())] {
            let result = create_submission_at(
                &student(),
                &form(),
                answers(),
                SubmissionStatus::SentToParent,
                email,
                ts(1_000),
            );
            assert!(matches!(result, Err(SlipSystemError::Validation(_))));
        }
    }

    #[test]
    fn test_create_normalizes_parent_email() {
        let new = create_submission_at(
            &student(),
            &form(),
            answers(),
            SubmissionStatus::SentToParent,
            Some("  Jane@Home.TEST ".to_string()),
            ts(1_000),
        )
        .unwrap();
        assert_eq!(new.parent_email.as_deref(), Some("jane@home.test"));
    }

    #[test]
    fn test_create_by_non_student_is_authorization_error() {
        for actor in [parent(), faculty()] {
            let result = create_submission_at(
                &actor,
                &form(),
                answers(),
                SubmissionStatus::Draft,
                None,
                ts(1_000),
            );
            assert!(matches!(result, Err(SlipSystemError::Authorization(_))));
        }
    }

    #[test]
    fn test_parent_signature_round_trip() {
        let created = snapshot_in(SubmissionStatus::SentToParent);
        let signed = apply_transition_at(&parent(), &created, &sign("Jane Doe"), ts(2_000)).unwrap();

        assert_eq!(signed.status, SubmissionStatus::SentToAdmin);
        assert_eq!(signed.parent_signature.as_deref(), Some("Jane Doe"));
        assert_eq!(signed.student_id, created.student_id);
        assert_eq!(signed.student_name, created.student_name);
        assert_eq!(signed.student_email, created.student_email);
        assert_eq!(signed.student_section, created.student_section);
        assert_eq!(signed.student_roll_number, created.student_roll_number);
        assert_eq!(signed.form_data, created.form_data);
        assert_eq!(signed.created_at, created.created_at);
        assert_eq!(signed.updated_at, ts(2_000));
        assert_eq!(signed.revision, created.revision + 1);
    }

    #[test]
    fn test_parent_email_match_is_case_insensitive() {
        let created = snapshot_in(SubmissionStatus::SentToParent);
        let mut actor = parent();
        actor.email = "JANE@Home.test".to_string();
        assert!(apply_transition_at(&actor, &created, &sign("Jane"), ts(2_000)).is_ok());
    }

    #[test]
    fn test_other_parent_cannot_sign() {
        let created = snapshot_in(SubmissionStatus::SentToParent);
        let mut stranger = parent();
        stranger.email = "someone@else.test".to_string();
        let result = apply_transition_at(&stranger, &created, &sign("Nope"), ts(2_000));
        assert!(matches!(result, Err(SlipSystemError::Authorization(_))));
    }

    #[test]
    fn test_sign_requires_non_blank_signature() {
        let created = snapshot_in(SubmissionStatus::SentToParent);
        for patch in [to(SubmissionStatus::SentToAdmin), sign("  ")] {
            let result = apply_transition_at(&parent(), &created, &patch, ts(2_000));
            assert!(matches!(result, Err(SlipSystemError::Validation(_))));
        }
    }

    #[test]
    fn test_parent_cannot_write_admin_comments() {
        let created = snapshot_in(SubmissionStatus::SentToParent);
        let mut patch = sign("Jane Doe");
        patch.admin_comments = Some("looks fine".to_string());
        let result = apply_transition_at(&parent(), &created, &patch, ts(2_000));
        assert!(matches!(result, Err(SlipSystemError::Authorization(_))));
    }

    #[test]
    fn test_parent_on_draft_is_illegal_transition() {
        let draft = snapshot_in(SubmissionStatus::Draft);
        for patch in [sign("Jane Doe"), SubmissionPatch::default()] {
            let err = apply_transition_at(&parent(), &draft, &patch, ts(2_000)).unwrap_err();
            assert!(matches!(err, SlipSystemError::IllegalTransition(_)));
            assert!(err.message().contains("'draft'"));
            assert!(err.message().contains("parent"));
        }
    }

    #[test]
    fn test_faculty_approves_with_comments() {
        let pending = snapshot_in(SubmissionStatus::SentToAdmin);
        let patch = SubmissionPatch {
            status: Some(SubmissionStatus::Approved),
            admin_comments: Some("ok".to_string()),
            ..Default::default()
        };
        let approved = apply_transition_at(&faculty(), &pending, &patch, ts(3_000)).unwrap();
        assert_eq!(approved.status, SubmissionStatus::Approved);
        assert_eq!(approved.admin_comments.as_deref(), Some("ok"));
        assert_eq!(approved.parent_signature.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_faculty_rejects_without_comments() {
        let pending = snapshot_in(SubmissionStatus::SentToAdmin);
        let rejected =
            apply_transition_at(&faculty(), &pending, &to(SubmissionStatus::Rejected), ts(3_000))
                .unwrap();
        assert_eq!(rejected.status, SubmissionStatus::Rejected);
        assert_eq!(rejected.admin_comments, None);
    }

    #[test]
    fn test_rejected_can_be_overridden_to_approved_but_not_back() {
        let rejected = snapshot_in(SubmissionStatus::Rejected);
        let approved =
            apply_transition_at(&faculty(), &rejected, &to(SubmissionStatus::Approved), ts(4_000))
                .unwrap();
        assert_eq!(approved.status, SubmissionStatus::Approved);

        let result =
            apply_transition_at(&faculty(), &approved, &to(SubmissionStatus::Rejected), ts(5_000));
        assert!(matches!(result, Err(SlipSystemError::IllegalTransition(_))));
    }

    #[test]
    fn test_rejected_cannot_loop_back_to_parent() {
        let rejected = snapshot_in(SubmissionStatus::Rejected);
        for actor in [student(), parent(), faculty()] {
            let result = apply_transition_at(
                &actor,
                &rejected,
                &to(SubmissionStatus::SentToParent),
                ts(4_000),
            );
            assert!(matches!(result, Err(SlipSystemError::IllegalTransition(_))));
        }
    }

    #[test]
    fn test_faculty_cannot_sign_for_parent() {
        let pending = snapshot_in(SubmissionStatus::SentToAdmin);
        let patch = SubmissionPatch {
            status: Some(SubmissionStatus::Approved),
            parent_signature: Some("Forged".to_string()),
            ..Default::default()
        };
        let result = apply_transition_at(&faculty(), &pending, &patch, ts(3_000));
        assert!(matches!(result, Err(SlipSystemError::Authorization(_))));
    }

    #[test]
    fn test_timestamps_are_truncated_to_whole_seconds() {
        let precise = Utc.timestamp_opt(1_500, 987_654_321).unwrap();
        let edited = apply_transition_at(
            &student(),
            &snapshot_in(SubmissionStatus::Draft),
            &SubmissionPatch::default(),
            precise,
        )
        .unwrap();
        assert_eq!(edited.updated_at, ts(1_500));

        let new = create_submission_at(
            &student(),
            &FormRef {
                id: 1,
                title: "Museum trip".to_string(),
            },
            FormData::new(),
            SubmissionStatus::Draft,
            None,
            precise,
        )
        .unwrap();
        assert_eq!(new.created_at, ts(1_500));
    }

    #[test]
    fn test_student_edits_own_draft_and_bumps_updated_at() {
        let draft = snapshot_in(SubmissionStatus::Draft);
        let mut new_answers = answers();
        new_answers.insert("allergies".to_string(), json!("none"));
        let patch = SubmissionPatch {
            form_data: Some(new_answers.clone()),
            parent_email: Some(" dad@home.test ".to_string()),
            ..Default::default()
        };
        let edited = apply_transition_at(&student(), &draft, &patch, ts(1_500)).unwrap();
        assert_eq!(edited.status, SubmissionStatus::Draft);
        assert_eq!(edited.form_data, new_answers);
        assert_eq!(edited.parent_email.as_deref(), Some("dad@home.test"));
        assert_eq!(edited.updated_at, ts(1_500));
        assert_eq!(edited.parent_signature, None);
    }

    #[test]
    fn test_student_empty_patch_on_draft_only_touches_updated_at() {
        let draft = snapshot_in(SubmissionStatus::Draft);
        let edited =
            apply_transition_at(&student(), &draft, &SubmissionPatch::default(), ts(1_500))
                .unwrap();
        let mut expected = draft.clone();
        expected.updated_at = ts(1_500);
        expected.revision += 1;
        assert_eq!(edited, expected);
    }

    #[test]
    fn test_student_cannot_edit_someone_elses_draft() {
        let draft = snapshot_in(SubmissionStatus::Draft);
        let mut other = student();
        other.id = 99;
        let result = apply_transition_at(
            &other,
            &draft,
            &SubmissionPatch {
                form_data: Some(FormData::new()),
                ..Default::default()
            },
            ts(1_500),
        );
        assert!(matches!(result, Err(SlipSystemError::Authorization(_))));
    }

    #[test]
    fn test_student_cannot_blank_parent_email() {
        let draft = snapshot_in(SubmissionStatus::Draft);
        let patch = SubmissionPatch {
            parent_email: Some("   ".to_string()),
            ..Default::default()
        };
        let result = apply_transition_at(&student(), &draft, &patch, ts(1_500));
        assert!(matches!(result, Err(SlipSystemError::Validation(_))));
    }

    #[test]
    fn test_student_cannot_edit_after_sending() {
        let sent = snapshot_in(SubmissionStatus::SentToParent);
        let patch = SubmissionPatch {
            form_data: Some(FormData::new()),
            ..Default::default()
        };
        let result = apply_transition_at(&student(), &sent, &patch, ts(1_500));
        assert!(matches!(result, Err(SlipSystemError::IllegalTransition(_))));
    }

    #[test]
    fn test_only_table_triples_are_accepted() {
        let actors = [student(), parent(), faculty()];
        for from in SubmissionStatus::all() {
            let snapshot = snapshot_in(*from);
            for target in SubmissionStatus::all() {
                for actor in &actors {
                    let patch = SubmissionPatch {
                        status: Some(*target),
                        parent_signature: (actor.role == UserRole::Parent)
                            .then(|| "Jane Doe".to_string()),
                        ..Default::default()
                    };
                    let result = apply_transition_at(actor, &snapshot, &patch, ts(9_000));
                    match find_rule(*from, *target, actor.role) {
                        Some(_) => assert!(
                            result.is_ok(),
                            "{from} -> {target} by {} should pass: {:?}",
                            actor.role,
                            result
                        ),
                        None => {
                            assert!(
                                matches!(result, Err(SlipSystemError::IllegalTransition(_))),
                                "{from} -> {target} by {} should be illegal",
                                actor.role
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rejection_leaves_snapshot_untouched() {
        let draft = snapshot_in(SubmissionStatus::Draft);
        let before = draft.clone();
        let _ = apply_transition_at(&faculty(), &draft, &to(SubmissionStatus::Approved), ts(9_000));
        let _ = apply_transition_at(&parent(), &draft, &sign("Jane"), ts(9_000));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_repeating_a_transition_is_illegal_once_status_moved() {
        let created = snapshot_in(SubmissionStatus::SentToParent);
        let signed = apply_transition_at(&parent(), &created, &sign("Jane Doe"), ts(2_000)).unwrap();
        let again = apply_transition_at(&parent(), &signed, &sign("Jane Doe"), ts(2_100));
        assert!(matches!(again, Err(SlipSystemError::IllegalTransition(_))));
    }

    #[test]
    fn test_repeating_a_draft_edit_is_a_no_op_success() {
        let draft = snapshot_in(SubmissionStatus::Draft);
        let patch = SubmissionPatch {
            status: Some(SubmissionStatus::Draft),
            form_data: Some(answers()),
            ..Default::default()
        };
        let once = apply_transition_at(&student(), &draft, &patch, ts(1_500)).unwrap();
        let twice = apply_transition_at(&student(), &once, &patch, ts(1_500)).unwrap();
        assert_eq!(once.form_data, twice.form_data);
        assert_eq!(once.status, twice.status);
    }

    #[test]
    fn test_two_decisions_from_one_snapshot_share_a_revision() {
        let pending = snapshot_in(SubmissionStatus::SentToAdmin);
        let approve =
            apply_transition_at(&faculty(), &pending, &to(SubmissionStatus::Approved), ts(3_000))
                .unwrap();
        let reject =
            apply_transition_at(&faculty(), &pending, &to(SubmissionStatus::Rejected), ts(3_000))
                .unwrap();
        // 两个决策基于同一快照，条件写入时只有一个能匹配 revision
        assert_eq!(approve.revision, reject.revision);
        assert_eq!(approve.revision, pending.revision + 1);
    }

    #[test]
    fn test_legal_actions_follow_the_table() {
        let pending = snapshot_in(SubmissionStatus::SentToAdmin);
        let actions: Vec<String> = legal_actions(&faculty(), &pending)
            .into_iter()
            .map(|a| a.action)
            .collect();
        assert_eq!(actions, vec!["approve".to_string(), "reject".to_string()]);

        assert!(legal_actions(&parent(), &pending).is_empty());
        assert!(legal_actions(&student(), &pending).is_empty());

        let sent = snapshot_in(SubmissionStatus::SentToParent);
        let sign_actions = legal_actions(&parent(), &sent);
        assert_eq!(sign_actions.len(), 1);
        assert_eq!(sign_actions[0].required_fields, vec!["parent_signature".to_string()]);

        let mut stranger = parent();
        stranger.email = "other@home.test".to_string();
        assert!(legal_actions(&stranger, &sent).is_empty());

        let approved = snapshot_in(SubmissionStatus::Approved);
        assert!(legal_actions(&faculty(), &approved).is_empty());
    }
}
