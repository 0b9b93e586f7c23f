//! 预导入模块，方便使用

pub use super::forms::{ActiveModel as FormActiveModel, Entity as Forms, Model as FormModel};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
