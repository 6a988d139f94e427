//! Audit record database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::AdminAction;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_actions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_id: String,
    pub target_type: String,
    pub details: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for AdminAction {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(AdminAction {
            id: model.id,
            admin_id: model.admin_id,
            action: model.action.parse().map_err(AppError::internal)?,
            target_id: model.target_id,
            target_type: model.target_type.parse().map_err(AppError::internal)?,
            details: serde_json::from_value(model.details)
                .map_err(|e| AppError::internal(format!("Corrupt audit details: {}", e)))?,
            created_at: model.created_at,
        })
    }
}

impl From<&AdminAction> for ActiveModel {
    fn from(action: &AdminAction) -> Self {
        ActiveModel {
            id: Set(action.id),
            admin_id: Set(action.admin_id),
            action: Set(action.action.as_str().to_string()),
            target_id: Set(action.target_id.clone()),
            target_type: Set(action.target_type.as_str().to_string()),
            details: Set(serde_json::json!(action.details)),
            created_at: Set(action.created_at),
        }
    }
}
