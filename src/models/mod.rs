//! 数据模型定义
//!
//! 请求、响应与业务实体。数据库实体位于 `entity` 模块，二者在存储层转换。

pub mod auth;
pub mod common;
pub mod forms;
pub mod submissions;
pub mod users;

pub use common::response::ApiResponse;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    RateLimitExceeded = 1029,

    // 认证与用户
    AuthFailed = 2001,
    RegisterFailed = 2002,
    UserEmailInvalid = 2003,
    UserEmailAlreadyExists = 2004,
    UserPasswordInvalid = 2005,
    UserNameInvalid = 2006,

    // 表单模板
    FormNotFound = 3001,
    FormInvalid = 3002,
    FormNotAvailable = 3003,

    // 提交与审批流程
    SubmissionNotFound = 4001,
    SubmissionInvalid = 4002,
    SubmissionForbidden = 4003,
    IllegalTransition = 4004,
    SubmissionConflict = 4005,
}
