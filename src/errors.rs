//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 工作流相关的四类错误（Validation / Authorization / IllegalTransition / Conflict）
//! 与基础设施错误共用同一个枚举，便于服务层统一映射为 HTTP 响应。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_slip_system_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum SlipSystemError {
            $($variant(String),)*
        }

        impl SlipSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SlipSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SlipSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(SlipSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl SlipSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        SlipSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_slip_system_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Serialization("E004", "Serialization Error"),
    NotFound("E005", "Resource Not Found"),
    Authentication("E006", "Authentication Error"),
    Validation("E101", "Validation Error"),
    Authorization("E102", "Authorization Error"),
    IllegalTransition("E103", "Illegal Transition Error"),
    Conflict("E104", "Conflict Error"),
}

impl SlipSystemError {
    /// 是否为工作流决策产生的错误（而非基础设施故障）
    pub fn is_workflow_error(&self) -> bool {
        matches!(
            self,
            SlipSystemError::Validation(_)
                | SlipSystemError::Authorization(_)
                | SlipSystemError::IllegalTransition(_)
                | SlipSystemError::Conflict(_)
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SlipSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SlipSystemError {}

impl From<sea_orm::DbErr> for SlipSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        SlipSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SlipSystemError {
    fn from(err: serde_json::Error) -> Self {
        SlipSystemError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SlipSystemError>;
