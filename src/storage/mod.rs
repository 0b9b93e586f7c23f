use std::sync::Arc;

use crate::models::{
    forms::{entities::Form, requests::CreateFormRequest},
    submissions::{
        entities::{NewSubmission, Submission},
        requests::SubmissionListQuery,
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段须已是哈希值）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 表单模板方法
    // 创建表单
    async fn create_form(&self, form: CreateFormRequest, created_by: i64) -> Result<Form>;
    // 通过ID获取表单
    async fn get_form_by_id(&self, id: i64) -> Result<Option<Form>>;
    // 列出全部表单（按创建时间倒序）
    async fn list_forms(&self) -> Result<Vec<Form>>;
    // 删除表单
    async fn delete_form(&self, id: i64) -> Result<bool>;

    /// 提交管理方法
    // 插入新提交，revision 从 0 开始
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission>;
    // 通过ID获取提交快照
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 按条件列出提交（按创建时间倒序）
    async fn list_submissions(&self, query: SubmissionListQuery) -> Result<Vec<Submission>>;
    // 条件写入：仅当库中 revision 仍为 expected_revision 时写入 next，
    // 否则返回 Conflict；记录不存在返回 NotFound
    async fn commit_submission(&self, expected_revision: i64, next: &Submission) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
