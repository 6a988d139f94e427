//! Notification database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Notification;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub metadata: Option<Json>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: model.id,
            user_id: model.user_id,
            kind: model.kind.parse().map_err(AppError::internal)?,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            metadata: model.metadata,
            created_at: model.created_at,
        })
    }
}

impl From<&Notification> for ActiveModel {
    fn from(notification: &Notification) -> Self {
        ActiveModel {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            kind: Set(notification.kind.as_str().to_string()),
            title: Set(notification.title.clone()),
            message: Set(notification.message.clone()),
            is_read: Set(notification.is_read),
            metadata: Set(notification.metadata.clone()),
            created_at: Set(notification.created_at),
        }
    }
}
