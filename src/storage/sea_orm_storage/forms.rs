use super::SeaOrmStorage;
use crate::entity::forms::{ActiveModel, Column, Entity as Forms};
use crate::errors::{Result, SlipSystemError};
use crate::models::forms::{entities::Form, requests::CreateFormRequest};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建表单模板
    pub async fn create_form_impl(&self, req: CreateFormRequest, created_by: i64) -> Result<Form> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title),
            fields: Set(serde_json::to_string(&req.fields)?),
            sections: Set(serde_json::to_string(&req.sections)?),
            created_by: Set(Some(created_by)),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("创建表单失败: {e}")))?;

        result.into_form()
    }

    /// 通过 ID 获取表单
    pub async fn get_form_by_id_impl(&self, id: i64) -> Result<Option<Form>> {
        let result = Forms::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("查询表单失败: {e}")))?;

        result.map(|m| m.into_form()).transpose()
    }

    /// 列出全部表单
    pub async fn list_forms_impl(&self) -> Result<Vec<Form>> {
        let models = Forms::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("查询表单列表失败: {e}")))?;

        models.into_iter().map(|m| m.into_form()).collect()
    }

    /// 删除表单
    pub async fn delete_form_impl(&self, id: i64) -> Result<bool> {
        let result = Forms::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SlipSystemError::database_operation(format!("删除表单失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
