//! 对象缓存
//!
//! 目前仅用于 JWT 中间件缓存已认证用户，避免每个请求都查库。

pub mod object_cache;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String);
    async fn remove(&self, key: &str);
}

pub async fn create_object_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache = object_cache::moka::MokaCacheWrapper::from_config();
    tracing::info!("对象缓存初始化完成: moka");
    Ok(Arc::new(cache))
}
