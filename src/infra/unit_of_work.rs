//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and is the only path by which an admin
//! mutation reaches storage: the entity write, its audit record and an
//! optional notification are applied in one database transaction.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel,
    TransactionTrait,
};
use std::sync::Arc;

use super::repositories::entities::{admin_action, notification, pool, system_setting, user};
use super::repositories::{
    conflict_on_unique, AdminActionRepository, AdminActionStore, NotificationRepository,
    NotificationStore, PoolRepository, PoolStore, SettingRepository, SettingStore, UserRepository,
    UserStore,
};
use crate::domain::{AdminAction, Notification, Pool, PoolChanges, SystemSetting, UserChanges};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// The primary entity write of an admin mutation.
///
/// Updates carry only the columns the mutation changed.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityWrite {
    InsertPool(Pool),
    UpdatePool(PoolChanges),
    UpdateUser(UserChanges),
    InsertSetting(SystemSetting),
    UpdateSetting(SystemSetting),
}

/// Everything one admin mutation writes
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub write: EntityWrite,
    pub audit: AdminAction,
    pub notification: Option<Notification>,
}

impl ChangeSet {
    pub fn new(write: EntityWrite, audit: AdminAction) -> Self {
        Self {
            write,
            audit,
            notification: None,
        }
    }

    pub fn notify(mut self, notification: Option<Notification>) -> Self {
        self.notification = notification;
        self
    }
}

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn pools(&self) -> Arc<dyn PoolRepository>;

    fn admin_actions(&self) -> Arc<dyn AdminActionRepository>;

    fn notifications(&self) -> Arc<dyn NotificationRepository>;

    fn settings(&self) -> Arc<dyn SettingRepository>;

    /// Apply the change set atomically. Nothing is written if any part fails.
    async fn commit(&self, changes: ChangeSet) -> AppResult<()>;
}

/// Transaction context applying writes within one database transaction.
///
/// The context borrows the transaction to ensure proper lifetime management.
struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    async fn apply(&self, write: &EntityWrite) -> AppResult<()> {
        match write {
            EntityWrite::InsertPool(p) => {
                pool::ActiveModel::try_from(p)?
                    .insert(self.txn)
                    .await
                    .map_err(|e| conflict_on_unique(e, "Contract address already registered"))?;
            }
            EntityWrite::UpdatePool(changes) => {
                pool::ActiveModel::from(changes)
                    .update(self.txn)
                    .await
                    .map_err(|e| missing_row(e, "Pool"))?;
            }
            EntityWrite::UpdateUser(changes) => {
                user::ActiveModel::from(changes)
                    .update(self.txn)
                    .await
                    .map_err(|e| missing_row(e, "User"))?;
            }
            EntityWrite::InsertSetting(s) => {
                system_setting::ActiveModel::from(s)
                    .insert(self.txn)
                    .await
                    .map_err(|e| conflict_on_unique(e, "Setting key already exists"))?;
            }
            EntityWrite::UpdateSetting(s) => {
                system_setting::ActiveModel::from(s)
                    .update(self.txn)
                    .await
                    .map_err(|e| missing_row(e, "Setting"))?;
            }
        }
        Ok(())
    }

    async fn append_audit(&self, action: &AdminAction) -> AppResult<()> {
        admin_action::ActiveModel::from(action)
            .insert(self.txn)
            .await?;
        Ok(())
    }

    async fn push_notification(&self, note: &Notification) -> AppResult<()> {
        notification::ActiveModel::from(note).insert(self.txn).await?;
        Ok(())
    }
}

fn missing_row(err: DbErr, entity: &str) -> AppError {
    match err {
        DbErr::RecordNotUpdated => AppError::not_found(entity),
        other => AppError::from(other),
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    pool_repo: Arc<PoolStore>,
    admin_action_repo: Arc<AdminActionStore>,
    notification_repo: Arc<NotificationStore>,
    setting_repo: Arc<SettingStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            pool_repo: Arc::new(PoolStore::new(db.clone())),
            admin_action_repo: Arc::new(AdminActionStore::new(db.clone())),
            notification_repo: Arc::new(NotificationStore::new(db.clone())),
            setting_repo: Arc::new(SettingStore::new(db.clone())),
            db,
        }
    }

    async fn apply_all(ctx: &TransactionContext<'_>, changes: &ChangeSet) -> AppResult<()> {
        ctx.apply(&changes.write).await?;
        ctx.append_audit(&changes.audit).await?;
        if let Some(note) = &changes.notification {
            ctx.push_notification(note).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn pools(&self) -> Arc<dyn PoolRepository> {
        self.pool_repo.clone()
    }

    fn admin_actions(&self) -> Arc<dyn AdminActionRepository> {
        self.admin_action_repo.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repo.clone()
    }

    fn settings(&self) -> Arc<dyn SettingRepository> {
        self.setting_repo.clone()
    }

    async fn commit(&self, changes: ChangeSet) -> AppResult<()> {
        // ReadCommitted: concurrent writers to one column resolve last-write-wins
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match Self::apply_all(&ctx, &changes).await {
            Ok(()) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActionDetails, AdminActionKind, SystemSetting, TargetType};
    use uuid::Uuid;

    #[test]
    fn change_set_defaults_to_no_notification() {
        let admin = Uuid::new_v4();
        let setting = SystemSetting::new("fees".into(), serde_json::json!(25), None, admin);
        let audit = AdminAction::new(
            admin,
            AdminActionKind::SystemSettingUpdated,
            TargetType::SystemSetting,
            "fees",
            ActionDetails::default(),
        );
        let changes = ChangeSet::new(EntityWrite::InsertSetting(setting), audit);
        assert!(changes.notification.is_none());
    }
}
