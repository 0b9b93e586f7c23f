use serde::Deserialize;
use ts_rs::TS;

use crate::models::users::entities::UserRole;

// 用户创建请求（注册与初始账号共用，存储前 password 会被替换为哈希值）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub name: String,
    pub section: Option<String>,
    pub roll_number: Option<String>,
}
