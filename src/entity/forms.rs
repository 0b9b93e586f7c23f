//! 表单模板实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "forms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    /// JSON 数组：字段定义
    #[sea_orm(column_type = "Text")]
    pub fields: String,
    /// JSON 数组：开放班级
    #[sea_orm(column_type = "Text")]
    pub sections: String,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_form(self) -> crate::errors::Result<crate::models::forms::entities::Form> {
        use crate::models::forms::entities::Form;

        Ok(Form {
            id: self.id,
            title: self.title,
            fields: serde_json::from_str(&self.fields)?,
            sections: serde_json::from_str(&self.sections)?,
            created_by: self.created_by,
            created_at: super::from_timestamp(self.created_at),
        })
    }
}
