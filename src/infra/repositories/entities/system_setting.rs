//! System setting database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::SystemSetting;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "system_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub key: String,
    pub value: Json,
    pub description: Option<String>,
    pub updated_by: Uuid,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SystemSetting {
    fn from(model: Model) -> Self {
        SystemSetting {
            id: model.id,
            key: model.key,
            value: model.value,
            description: model.description,
            updated_by: model.updated_by,
            updated_at: model.updated_at,
        }
    }
}

impl From<&SystemSetting> for ActiveModel {
    fn from(setting: &SystemSetting) -> Self {
        ActiveModel {
            id: Set(setting.id),
            key: Set(setting.key.clone()),
            value: Set(setting.value.clone()),
            description: Set(setting.description.clone()),
            updated_by: Set(setting.updated_by),
            updated_at: Set(setting.updated_at),
        }
    }
}
