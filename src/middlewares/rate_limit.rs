/*!
 * 速率限制中间件
 *
 * 固定窗口计数：同一个键在窗口内超过上限后返回 429。
 * 已认证请求按用户 ID 计数，匿名请求按客户端 IP 计数。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login));
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::{ErrorCode, users::entities::User};

use super::create_error_response;

// 键: 前缀:标识，值: 窗口内请求计数。条目自首次写入起过期，即窗口长度
static RATE_LIMIT_CACHE: Lazy<Cache<String, u32>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(60))
        .max_capacity(100_000)
        .build()
});

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(key_prefix: &'static str, max_requests: u32) -> Self {
        Self {
            max_requests,
            window_secs: 60,
            key_prefix,
        }
    }

    /// 登录：5次/分钟/IP
    pub fn login() -> Self {
        Self::new("login", 5)
    }

    /// 注册：3次/分钟/IP
    pub fn register() -> Self {
        Self::new("register", 3)
    }

    /// 提交写操作（创建与状态变更）：30次/分钟/用户
    pub fn submission_write() -> Self {
        Self::new("submission_write", 30)
    }
}

/// 客户端标识：优先连接信息，其次代理转发头
fn client_ip(req: &ServiceRequest) -> String {
    let from_connection = req
        .connection_info()
        .realip_remote_addr()
        .and_then(parse_ip);
    if let Some(ip) = from_connection {
        return ip.to_string();
    }

    ["X-Forwarded-For", "X-Real-IP"]
        .iter()
        .filter_map(|name| req.headers().get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .find_map(parse_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// realip_remote_addr 可能带端口
fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<std::net::SocketAddr>().ok().map(|a| a.ip()))
}

fn rate_limit_key(prefix: &str, user_id: Option<i64>, ip: impl FnOnce() -> String) -> String {
    match user_id {
        Some(id) => format!("{prefix}:user:{id}"),
        None => format!("{prefix}:ip:{}", ip()),
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            policy: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    policy: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let user_id = req.extensions().get::<User>().map(|user| user.id);
            let key = rate_limit_key(policy.key_prefix, user_id, || client_ip(&req));

            let current = RATE_LIMIT_CACHE.get(&key).await.unwrap_or(0);
            if current >= policy.max_requests {
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    key, current, policy.max_requests
                );
                let mut response = create_error_response(
                    StatusCode::TOO_MANY_REQUESTS,
                    ErrorCode::RateLimitExceeded,
                    "请求过于频繁，请稍后再试",
                );
                response.headers_mut().insert(
                    actix_web::http::header::RETRY_AFTER,
                    HeaderValue::from(policy.window_secs),
                );
                return Ok(req.into_response(response.map_into_right_body()));
            }

            RATE_LIMIT_CACHE.insert(key, current + 1).await;
            let remaining = policy.max_requests - current - 1;

            let mut res = srv.call(req).await?;
            let headers = res.headers_mut();
            headers.insert(LIMIT_HEADER, HeaderValue::from(policy.max_requests));
            headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
            Ok(res.map_into_left_body())
        })
    }
}
