//! Pool repository.
//!
//! Reads only, plus the unaudited insert used by user submissions. Admin
//! mutations go through [`UnitOfWork::commit`](crate::infra::UnitOfWork::commit).

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::base::{conflict_on_unique, into_domain};
use super::entities::pool::{self, ActiveModel, Entity as PoolEntity};
use crate::domain::{ApprovalStatus, Pool};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PoolRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Pool>>;

    async fn find_by_contract(&self, contract_address: &str) -> AppResult<Option<Pool>>;

    /// Every pool, newest first
    async fn list(&self) -> AppResult<Vec<Pool>>;

    async fn list_by_approval(&self, status: ApprovalStatus) -> AppResult<Vec<Pool>>;

    /// Approved and active pools, the public catalogue
    async fn list_public(&self) -> AppResult<Vec<Pool>>;

    async fn insert(&self, pool: Pool) -> AppResult<Pool>;
}

pub struct PoolStore {
    db: DatabaseConnection,
}

impl PoolStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PoolRepository for PoolStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Pool>> {
        PoolEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Pool::try_from)
            .transpose()
    }

    async fn find_by_contract(&self, contract_address: &str) -> AppResult<Option<Pool>> {
        PoolEntity::find()
            .filter(pool::Column::ContractAddress.eq(contract_address))
            .one(&self.db)
            .await?
            .map(Pool::try_from)
            .transpose()
    }

    async fn list(&self) -> AppResult<Vec<Pool>> {
        let models = PoolEntity::find()
            .order_by_desc(pool::Column::CreatedAt)
            .all(&self.db)
            .await?;

        into_domain(models)
    }

    async fn list_by_approval(&self, status: ApprovalStatus) -> AppResult<Vec<Pool>> {
        let models = PoolEntity::find()
            .filter(pool::Column::ApprovalStatus.eq(status.as_str()))
            .order_by_desc(pool::Column::CreatedAt)
            .all(&self.db)
            .await?;

        into_domain(models)
    }

    async fn list_public(&self) -> AppResult<Vec<Pool>> {
        let models = PoolEntity::find()
            .filter(pool::Column::ApprovalStatus.eq(ApprovalStatus::Approved.as_str()))
            .filter(pool::Column::IsActive.eq(true))
            .order_by_asc(pool::Column::MaturityDate)
            .all(&self.db)
            .await?;

        into_domain(models)
    }

    async fn insert(&self, pool: Pool) -> AppResult<Pool> {
        let model = ActiveModel::try_from(&pool)?
            .insert(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Contract address already registered"))?;

        Pool::try_from(model)
    }
}
