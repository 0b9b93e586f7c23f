/*!
 * 基于角色的访问控制中间件
 *
 * 必须挂在 RequireJWT 之后：从请求扩展读取当前用户，角色不在允许列表内时返回 403。
 * 这里只做粗粒度的入口控制，提交级别的归属与状态校验由审批流程引擎负责。
 *
 * ```rust,ignore
 * web::scope("/api/v1/forms")
 *     .wrap(RequireRole::new(&UserRole::Faculty))
 *     .wrap(RequireJWT)
 *     .route("", web::post().to(create_form));
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<[UserRole]>,
}

impl RequireRole {
    /// 仅允许指定角色
    pub fn new(role: &UserRole) -> Self {
        Self {
            allowed: Rc::from([*role]),
        }
    }

    /// 允许任一角色
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed: roles.iter().map(|r| **r).collect(),
        }
    }

    fn permits(&self, role: UserRole) -> bool {
        self.allowed.contains(&role)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            policy: self.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    policy: RequireRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
            let current = req
                .extensions()
                .get::<User>()
                .map(|user| (user.id, user.role));

            let (status, message) = match current {
                Some((_, role)) if policy.permits(role) => {
                    return Ok(srv.call(req).await?.map_into_left_body());
                }
                Some((user_id, role)) => {
                    info!(
                        "Access denied for user {} (role: {}). Allowed roles: {:?}",
                        user_id, role, policy.allowed
                    );
                    (
                        StatusCode::FORBIDDEN,
                        format!("role '{role}' is not allowed to access this resource"),
                    )
                }
                None => {
                    info!("Role check without authenticated user, is RequireJWT applied?");
                    (
                        StatusCode::UNAUTHORIZED,
                        "Authentication required".to_string(),
                    )
                }
            };

            let code = if status == StatusCode::FORBIDDEN {
                ErrorCode::Forbidden
            } else {
                ErrorCode::Unauthorized
            };
            Ok(req.into_response(
                create_error_response(status, code, &message).map_into_right_body(),
            ))
        })
    }
}
