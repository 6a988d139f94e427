//! Read side of the audit log. Records are only ever written by
//! [`UnitOfWork::commit`](crate::infra::UnitOfWork::commit).

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use super::base::into_domain;
use super::entities::admin_action::{self, Entity as AdminActionEntity};
use crate::domain::{AdminAction, TargetType};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminActionRepository: Send + Sync {
    /// Newest first, offset-paged
    async fn list_page(&self, offset: u64, limit: u64) -> AppResult<Vec<AdminAction>>;

    /// Full history of one target, newest first
    async fn list_for_target(
        &self,
        target_type: TargetType,
        target_id: String,
    ) -> AppResult<Vec<AdminAction>>;
}

pub struct AdminActionStore {
    db: DatabaseConnection,
}

impl AdminActionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminActionRepository for AdminActionStore {
    async fn list_page(&self, offset: u64, limit: u64) -> AppResult<Vec<AdminAction>> {
        let models = AdminActionEntity::find()
            .order_by_desc(admin_action::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        into_domain(models)
    }

    async fn list_for_target(
        &self,
        target_type: TargetType,
        target_id: String,
    ) -> AppResult<Vec<AdminAction>> {
        let models = AdminActionEntity::find()
            .filter(admin_action::Column::TargetType.eq(target_type.as_str()))
            .filter(admin_action::Column::TargetId.eq(target_id))
            .order_by_desc(admin_action::Column::CreatedAt)
            .all(&self.db)
            .await?;

        into_domain(models)
    }
}
