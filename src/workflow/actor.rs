use crate::models::forms::entities::Form;
use crate::models::users::entities::{User, UserRole};

/// 已认证的操作者
///
/// 只能由可信的协作方（JWT 中间件解析出的存储用户）构造，
/// 绝不能取自客户端请求体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
    pub email: String,
    pub name: String,
    pub section: Option<String>,
    pub roll_number: Option<String>,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            email: user.email.clone(),
            name: user.name.clone(),
            section: user.section.clone(),
            roll_number: user.roll_number.clone(),
        }
    }
}

/// 提交所引用的表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRef {
    pub id: i64,
    pub title: String,
}

impl From<&Form> for FormRef {
    fn from(form: &Form) -> Self {
        Self {
            id: form.id,
            title: form.title.clone(),
        }
    }
}
