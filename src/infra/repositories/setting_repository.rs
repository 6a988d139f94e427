//! System settings repository (read side).

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::entities::system_setting::{self, Entity as SettingEntity};
use crate::domain::SystemSetting;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SettingRepository: Send + Sync {
    async fn find_by_key(&self, key: &str) -> AppResult<Option<SystemSetting>>;

    /// All settings ordered by key
    async fn list(&self) -> AppResult<Vec<SystemSetting>>;
}

pub struct SettingStore {
    db: DatabaseConnection,
}

impl SettingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingRepository for SettingStore {
    async fn find_by_key(&self, key: &str) -> AppResult<Option<SystemSetting>> {
        let model = SettingEntity::find()
            .filter(system_setting::Column::Key.eq(key))
            .one(&self.db)
            .await?;

        Ok(model.map(SystemSetting::from))
    }

    async fn list(&self) -> AppResult<Vec<SystemSetting>> {
        let models = SettingEntity::find()
            .order_by_asc(system_setting::Column::Key)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(SystemSetting::from).collect())
    }
}
