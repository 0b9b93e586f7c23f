use crate::cache::{ObjectCache, create_object_cache};
use crate::errors::Result;
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 初始教职工账号邮箱
pub const DEFAULT_FACULTY_EMAIL: &str = "faculty@school.local";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化默认教职工账号
///
/// 仅在用户表为空时创建；`password` 为空则生成随机密码并打印一次。
/// 返回新建的账号，已有用户时返回 None。
pub(crate) async fn seed_faculty(
    storage: &dyn Storage,
    password: Option<String>,
) -> Result<Option<User>> {
    let count = storage.count_users().await?;
    if count > 0 {
        debug!(
            "Database already has {} user(s), skipping faculty seed",
            count
        );
        return Ok(None);
    }
    info!("No users found in database, creating default faculty account...");

    let password = password.unwrap_or_else(|| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN_PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Login: {}", DEFAULT_FACULTY_EMAIL);
        warn!("  Generated password: {}", pwd);
        warn!("==========================================================");
        pwd
    });

    let user = storage
        .create_user(CreateUserRequest {
            email: DEFAULT_FACULTY_EMAIL.to_string(),
            password: hash_password(&password)?,
            role: UserRole::Faculty,
            name: "Administrator".to_string(),
            section: None,
            roll_number: None,
        })
        .await?;

    info!(
        "Default faculty account created (ID: {}, email: {})",
        user.id, user.email
    );
    Ok(Some(user))
}

/// 准备服务器启动的上下文：存储（含迁移）、初始账号、对象缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let password = std::env::var("ADMIN_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty());
    if let Err(e) = seed_faculty(storage.as_ref(), password).await {
        warn!("Failed to seed faculty account: {}", e);
    }

    let cache = create_object_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
