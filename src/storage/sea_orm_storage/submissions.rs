//! 提交存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{Result, SlipSystemError};
use crate::models::submissions::{
    entities::{NewSubmission, Submission},
    requests::SubmissionListQuery,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 插入新提交
    pub async fn create_submission_impl(&self, new: NewSubmission) -> Result<Submission> {
        let created_at = new.created_at.timestamp();

        let model = ActiveModel {
            form_id: Set(new.form_id),
            form_title: Set(new.form_title),
            student_id: Set(new.student_id),
            student_name: Set(new.student_name),
            student_email: Set(new.student_email),
            student_section: Set(new.student_section),
            student_roll_number: Set(new.student_roll_number),
            form_data: Set(serde_json::to_string(&new.form_data)?),
            parent_email: Set(new.parent_email),
            status: Set(new.status.to_string()),
            parent_signature: Set(None),
            admin_comments: Set(None),
            revision: Set(0),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("创建提交失败: {e}")))?;

        result.into_submission()
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("查询提交失败: {e}")))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 按条件列出提交
    pub async fn list_submissions_impl(&self, query: SubmissionListQuery) -> Result<Vec<Submission>> {
        let mut select = Submissions::find();

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if let Some(ref parent_email) = query.parent_email {
            select = select.filter(Column::ParentEmail.eq(parent_email.trim().to_lowercase()));
        }

        if !query.statuses.is_empty() {
            select = select.filter(
                Column::Status.is_in(query.statuses.iter().map(|s| s.to_string())),
            );
        }

        let models = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("查询提交列表失败: {e}")))?;

        models.into_iter().map(|m| m.into_submission()).collect()
    }

    /// 条件写入：WHERE id = ? AND revision = ?
    pub async fn commit_submission_impl(&self, expected_revision: i64, next: &Submission) -> Result<()> {
        // 创建时写入的引用字段不在此更新
        let changes = ActiveModel {
            form_data: Set(serde_json::to_string(&next.form_data)?),
            parent_email: Set(next.parent_email.clone()),
            status: Set(next.status.to_string()),
            parent_signature: Set(next.parent_signature.clone()),
            admin_comments: Set(next.admin_comments.clone()),
            revision: Set(next.revision),
            updated_at: Set(next.updated_at.timestamp()),
            ..Default::default()
        };

        let result = Submissions::update_many()
            .set(changes)
            .filter(Column::Id.eq(next.id))
            .filter(Column::Revision.eq(expected_revision))
            .exec(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("更新提交失败: {e}")))?;

        if result.rows_affected == 1 {
            return Ok(());
        }

        // 未命中：区分记录不存在与版本已变化
        let exists = Submissions::find_by_id(next.id)
            .count(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("查询提交失败: {e}")))?
            > 0;

        if exists {
            Err(SlipSystemError::conflict(format!(
                "submission {} was modified concurrently (expected revision {expected_revision})",
                next.id
            )))
        } else {
            Err(SlipSystemError::not_found(format!(
                "submission {} not found",
                next.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::SeaOrmStorage;
    use super::super::test_support::{memory_storage, seed_user};
    use crate::errors::SlipSystemError;
    use crate::models::submissions::{
        entities::{FormData, Submission, SubmissionStatus},
        requests::{SubmissionListQuery, SubmissionPatch},
    };
    use crate::models::users::entities::{User, UserRole};
    use crate::workflow::{self, Actor, FormRef};
    use chrono::{Duration, Utc};

    async fn create(
        storage: &SeaOrmStorage,
        student: &User,
        target: SubmissionStatus,
        parent_email: Option<&str>,
        offset_secs: i64,
    ) -> Submission {
        let form = FormRef {
            id: 1,
            title: "Museum trip".to_string(),
        };
        let new = workflow::create_submission_at(
            &Actor::from(student),
            &form,
            FormData::new(),
            target,
            parent_email.map(str::to_string),
            Utc::now() + Duration::seconds(offset_secs),
        )
        .unwrap();
        storage.create_submission_impl(new).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_reload() {
        let storage = memory_storage().await;
        let student = seed_user(&storage, "sam@school.test", UserRole::Student, Some("A")).await;

        let created = create(
            &storage,
            &student,
            SubmissionStatus::SentToParent,
            Some("jane@home.test"),
            0,
        )
        .await;
        assert_eq!(created.revision, 0);
        assert_eq!(created.student_section.as_deref(), Some("A"));

        let loaded = storage
            .get_submission_by_id_impl(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let storage = memory_storage().await;
        let sam = seed_user(&storage, "sam@school.test", UserRole::Student, Some("A")).await;
        let kim = seed_user(&storage, "kim@school.test", UserRole::Student, Some("A")).await;

        let older = create(&storage, &sam, SubmissionStatus::Draft, None, 0).await;
        let newer = create(
            &storage,
            &sam,
            SubmissionStatus::SentToParent,
            Some("jane@home.test"),
            10,
        )
        .await;
        create(&storage, &kim, SubmissionStatus::Draft, None, 20).await;

        let mine = storage
            .list_submissions_impl(SubmissionListQuery {
                student_id: Some(sam.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            mine.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );

        let for_parent = storage
            .list_submissions_impl(SubmissionListQuery {
                parent_email: Some("JANE@home.test".to_string()),
                statuses: SubmissionStatus::parent_visible().to_vec(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(for_parent.len(), 1);
        assert_eq!(for_parent[0].id, newer.id);

        let drafts = storage
            .list_submissions_impl(SubmissionListQuery {
                statuses: vec![SubmissionStatus::Draft],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(drafts.len(), 2);
    }

    #[tokio::test]
    async fn test_commit_requires_matching_revision() {
        let storage = memory_storage().await;
        let student = seed_user(&storage, "sam@school.test", UserRole::Student, Some("A")).await;
        let parent = seed_user(&storage, "jane@home.test", UserRole::Parent, None).await;
        let snapshot = create(
            &storage,
            &student,
            SubmissionStatus::SentToParent,
            Some("jane@home.test"),
            0,
        )
        .await;

        let patch = SubmissionPatch {
            status: Some(SubmissionStatus::SentToAdmin),
            parent_signature: Some("Jane Doe".to_string()),
            ..Default::default()
        };
        let next = workflow::apply_transition(&Actor::from(&parent), &snapshot, &patch).unwrap();

        storage
            .commit_submission_impl(snapshot.revision, &next)
            .await
            .unwrap();

        // 同一快照再次提交：revision 已前进
        let stale = storage.commit_submission_impl(snapshot.revision, &next).await;
        assert!(matches!(stale, Err(SlipSystemError::Conflict(_))));

        let stored = storage
            .get_submission_by_id_impl(snapshot.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubmissionStatus::SentToAdmin);
        assert_eq!(stored.parent_signature.as_deref(), Some("Jane Doe"));
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn test_concurrent_faculty_decisions_only_one_lands() {
        let storage = memory_storage().await;
        let student = seed_user(&storage, "sam@school.test", UserRole::Student, Some("A")).await;
        let faculty_a = seed_user(&storage, "a@school.test", UserRole::Faculty, None).await;
        let faculty_b = seed_user(&storage, "b@school.test", UserRole::Faculty, None).await;
        let mut snapshot = create(
            &storage,
            &student,
            SubmissionStatus::SentToParent,
            Some("jane@home.test"),
            0,
        )
        .await;
        snapshot.status = SubmissionStatus::SentToAdmin;
        snapshot.revision = 1;
        storage.commit_submission_impl(0, &snapshot).await.unwrap();

        let approve = workflow::apply_transition(
            &Actor::from(&faculty_a),
            &snapshot,
            &SubmissionPatch {
                status: Some(SubmissionStatus::Approved),
                ..Default::default()
            },
        )
        .unwrap();
        let reject = workflow::apply_transition(
            &Actor::from(&faculty_b),
            &snapshot,
            &SubmissionPatch {
                status: Some(SubmissionStatus::Rejected),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(storage.commit_submission_impl(1, &approve).await.is_ok());
        assert!(matches!(
            storage.commit_submission_impl(1, &reject).await,
            Err(SlipSystemError::Conflict(_))
        ));

        let stored = storage
            .get_submission_by_id_impl(snapshot.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubmissionStatus::Approved);
    }

    #[tokio::test]
    async fn test_commit_on_missing_row_is_not_found() {
        let storage = memory_storage().await;
        let student = seed_user(&storage, "sam@school.test", UserRole::Student, Some("A")).await;
        let mut ghost = create(&storage, &student, SubmissionStatus::Draft, None, 0).await;
        ghost.id += 1000;
        let result = storage.commit_submission_impl(0, &ghost).await;
        assert!(matches!(result, Err(SlipSystemError::NotFound(_))));
    }
}
