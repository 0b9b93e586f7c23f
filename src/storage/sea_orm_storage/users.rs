use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{Result, SlipSystemError};
use crate::models::users::{entities::User, requests::CreateUserRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            email: Set(req.email.trim().to_lowercase()),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            name: Set(req.name),
            section: Set(req.section),
            roll_number: Set(req.roll_number),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户（邮箱统一小写存储）
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 用户总数
    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("统计用户失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let storage = memory_storage().await;
        let created = seed_user(&storage, "Parent@Home.test", UserRole::Parent, None).await;
        assert_eq!(created.email, "parent@home.test");

        let found = storage
            .get_user_by_email_impl("PARENT@home.TEST")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, UserRole::Parent);
        assert_eq!(storage.count_users_impl().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let storage = memory_storage().await;
        seed_user(&storage, "sam@school.test", UserRole::Student, Some("A")).await;
        let again = storage
            .create_user_impl(crate::models::users::requests::CreateUserRequest {
                email: "SAM@school.test".to_string(),
                password: "hashed".to_string(),
                role: UserRole::Student,
                name: "Sam".to_string(),
                section: None,
                roll_number: None,
            })
            .await;
        assert!(again.is_err());
    }
}
