//! 提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub form_id: i64,
    pub form_title: String,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub student_section: Option<String>,
    pub student_roll_number: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub form_data: String,
    pub parent_email: Option<String>,
    pub status: String,
    pub parent_signature: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_comments: Option<String>,
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::forms::Entity",
        from = "Column::FormId",
        to = "super::forms::Column::Id"
    )]
    Form,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::forms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(
        self,
    ) -> crate::errors::Result<crate::models::submissions::entities::Submission> {
        use crate::errors::SlipSystemError;
        use crate::models::submissions::entities::{Submission, SubmissionStatus};

        let status = self
            .status
            .parse::<SubmissionStatus>()
            .map_err(SlipSystemError::serialization)?;

        Ok(Submission {
            id: self.id,
            form_id: self.form_id,
            form_title: self.form_title,
            student_id: self.student_id,
            student_name: self.student_name,
            student_email: self.student_email,
            student_section: self.student_section,
            student_roll_number: self.student_roll_number,
            form_data: serde_json::from_str(&self.form_data)?,
            parent_email: self.parent_email,
            status,
            parent_signature: self.parent_signature,
            admin_comments: self.admin_comments,
            revision: self.revision,
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        })
    }
}
