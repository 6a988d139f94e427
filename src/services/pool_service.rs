//! Pool lifecycle service.
//!
//! The sole authority for mutating a pool's status, approval and activity
//! fields. Every admin entry point resolves the caller, loads the pool,
//! applies the change and commits it together with its audit record.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{require_admin, require_user};
use super::audit::{audit_entry, commit_audited, metadata};
use crate::config::{
    REASON_INVESTMENT_CONFIRMED, REASON_POOL_ACTIVATED, REASON_POOL_APPROVED,
    REASON_POOL_CREATED, REASON_POOL_PAUSED, REASON_POOL_REJECTED, TITLE_POOL_APPROVED,
    TITLE_POOL_REJECTED,
};
use crate::domain::{
    parse_amount, ActionDetails, AdminActionKind, AuthenticatedCaller, NewNotification, NewPool,
    Notification, NotificationKind, Pool, PoolChanges, PoolStatus, TargetType, TransitionPolicy,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{EntityWrite, UnitOfWork};

/// Pool service trait for dependency injection.
#[async_trait]
pub trait PoolService: Send + Sync {
    /// Create a funding, pre-approved, active pool
    async fn create_pool(&self, caller: &AuthenticatedCaller, spec: NewPool) -> AppResult<Uuid>;

    /// Submit a pool for admin review (not audited)
    async fn submit_pool(&self, caller: &AuthenticatedCaller, spec: NewPool) -> AppResult<Uuid>;

    async fn approve_pool(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        approved: bool,
        reason: Option<String>,
    ) -> AppResult<Uuid>;

    async fn update_pool_status(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        status: PoolStatus,
        reason: Option<String>,
    ) -> AppResult<Uuid>;

    async fn confirm_investment(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        actual_invested: String,
        proof_hash: String,
    ) -> AppResult<Uuid>;

    /// Move a pool to EMERGENCY. `reason` is mandatory.
    async fn emergency_action(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        action: String,
        reason: String,
    ) -> AppResult<Uuid>;

    async fn toggle_pool_active(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Uuid>;

    async fn get_pool(&self, pool_id: Uuid) -> AppResult<Pool>;

    /// Approved and active pools
    async fn list_pools(&self) -> AppResult<Vec<Pool>>;
}

/// Concrete implementation of PoolService using Unit of Work.
pub struct PoolManager<U: UnitOfWork> {
    uow: Arc<U>,
    policy: TransitionPolicy,
}

impl<U: UnitOfWork> PoolManager<U> {
    pub fn new(uow: Arc<U>, policy: TransitionPolicy) -> Self {
        Self { uow, policy }
    }

    async fn load_pool(&self, pool_id: Uuid) -> AppResult<Pool> {
        self.uow
            .pools()
            .find_by_id(pool_id)
            .await?
            .ok_or_not_found("Pool")
    }

    async fn ensure_contract_free(&self, contract_address: &str) -> AppResult<()> {
        if self
            .uow
            .pools()
            .find_by_contract(contract_address)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Contract address already registered"));
        }
        Ok(())
    }

    /// Build the approval notification for the pool's creator, if they still exist.
    async fn approval_notice(&self, pool: &Pool, approved: bool, reason: &str) -> Option<Notification> {
        let creator = match self.uow.users().find_by_id(pool.created_by).await {
            Ok(Some(creator)) => creator,
            Ok(None) => {
                tracing::debug!(pool_id = %pool.id, "pool creator no longer exists, skipping notice");
                return None;
            }
            Err(e) => {
                tracing::warn!(pool_id = %pool.id, error = %e, "creator lookup failed, skipping notice");
                return None;
            }
        };

        let (kind, title, message) = if approved {
            let message = if pool.is_active {
                format!("Your pool \"{}\" has been approved and is now active.", pool.name)
            } else {
                format!(
                    "Your pool \"{}\" has been approved and will go live once an admin activates it.",
                    pool.name
                )
            };
            (NotificationKind::PoolApproved, TITLE_POOL_APPROVED, message)
        } else {
            (
                NotificationKind::PoolRejected,
                TITLE_POOL_REJECTED,
                format!("Your pool \"{}\" has been rejected. Reason: {}", pool.name, reason),
            )
        };

        Some(Notification::new(NewNotification {
            user_id: creator.id,
            kind,
            title: title.to_string(),
            message,
            metadata: Some(json!({ "poolId": pool.id })),
        }))
    }
}

#[async_trait]
impl<U: UnitOfWork> PoolService for PoolManager<U> {
    async fn create_pool(&self, caller: &AuthenticatedCaller, spec: NewPool) -> AppResult<Uuid> {
        let admin = require_admin(self.uow.users().as_ref(), caller).await?;
        spec.ensure_valid()?;
        self.ensure_contract_free(&spec.contract_address).await?;

        let pool = Pool::created_by_admin(spec, &admin);
        let pool_id = pool.id;
        let audit = audit_entry(
            &admin,
            AdminActionKind::PoolApproved,
            TargetType::Pool,
            pool_id.to_string(),
            ActionDetails::reason(REASON_POOL_CREATED).metadata(metadata([
                ("poolName", json!(pool.name)),
                ("contractAddress", json!(pool.contract_address)),
            ])),
        );

        commit_audited(self.uow.as_ref(), EntityWrite::InsertPool(pool), audit, None).await?;
        Ok(pool_id)
    }

    async fn submit_pool(&self, caller: &AuthenticatedCaller, spec: NewPool) -> AppResult<Uuid> {
        let submitter = require_user(self.uow.users().as_ref(), caller).await?;
        spec.ensure_valid()?;
        self.ensure_contract_free(&spec.contract_address).await?;

        let pool = self
            .uow
            .pools()
            .insert(Pool::submitted_by(spec, &submitter))
            .await?;

        tracing::info!(pool_id = %pool.id, submitter = %submitter.id, "pool submitted for review");
        Ok(pool.id)
    }

    async fn approve_pool(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        approved: bool,
        reason: Option<String>,
    ) -> AppResult<Uuid> {
        let admin = require_admin(self.uow.users().as_ref(), caller).await?;
        let stored = self.load_pool(pool_id).await?;
        let mut pool = stored.clone();

        let default_reason = if approved {
            REASON_POOL_APPROVED
        } else {
            REASON_POOL_REJECTED
        };
        let audit_reason = reason.clone().unwrap_or_else(|| default_reason.to_string());
        let notice = self.approval_notice(&pool, approved, &audit_reason).await;

        pool.decide_approval(approved, admin.id, reason);

        let kind = if approved {
            AdminActionKind::PoolApproved
        } else {
            AdminActionKind::PoolRejected
        };
        let audit = audit_entry(
            &admin,
            kind,
            TargetType::Pool,
            pool_id.to_string(),
            ActionDetails::reason(audit_reason)
                .metadata(metadata([("poolName", json!(pool.name))])),
        );

        let write = EntityWrite::UpdatePool(PoolChanges::between(&stored, &pool));
        commit_audited(self.uow.as_ref(), write, audit, notice).await?;
        Ok(pool_id)
    }

    async fn update_pool_status(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        status: PoolStatus,
        reason: Option<String>,
    ) -> AppResult<Uuid> {
        let admin = require_admin(self.uow.users().as_ref(), caller).await?;
        let stored = self.load_pool(pool_id).await?;
        let mut pool = stored.clone();
        self.policy.check(pool.status, status)?;

        let old_status = pool.set_status(status);
        let reason = reason
            .unwrap_or_else(|| format!("Status changed from {} to {}", old_status, status));
        let audit = audit_entry(
            &admin,
            AdminActionKind::PoolStatusUpdated,
            TargetType::Pool,
            pool_id.to_string(),
            ActionDetails::reason(reason).change(old_status.as_str(), status.as_str()),
        );

        let write = EntityWrite::UpdatePool(PoolChanges::between(&stored, &pool));
        commit_audited(self.uow.as_ref(), write, audit, None).await?;
        Ok(pool_id)
    }

    async fn confirm_investment(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        actual_invested: String,
        proof_hash: String,
    ) -> AppResult<Uuid> {
        let admin = require_admin(self.uow.users().as_ref(), caller).await?;
        if parse_amount(&actual_invested).is_none() {
            return Err(AppError::validation(
                "Actual invested must be a non-negative decimal amount",
            ));
        }
        let stored = self.load_pool(pool_id).await?;
        let mut pool = stored.clone();
        self.policy.check(pool.status, PoolStatus::Invested)?;

        pool.confirm_investment(actual_invested.clone());
        let audit = audit_entry(
            &admin,
            AdminActionKind::InvestmentConfirmed,
            TargetType::Pool,
            pool_id.to_string(),
            ActionDetails::reason(REASON_INVESTMENT_CONFIRMED).metadata(metadata([
                ("actualInvested", json!(actual_invested)),
                ("proofHash", json!(proof_hash)),
            ])),
        );

        let write = EntityWrite::UpdatePool(PoolChanges::between(&stored, &pool));
        commit_audited(self.uow.as_ref(), write, audit, None).await?;
        Ok(pool_id)
    }

    async fn emergency_action(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        action: String,
        reason: String,
    ) -> AppResult<Uuid> {
        let admin = require_admin(self.uow.users().as_ref(), caller).await?;
        if reason.trim().is_empty() {
            return Err(AppError::validation("A reason is required for emergency actions"));
        }
        let stored = self.load_pool(pool_id).await?;
        let mut pool = stored.clone();
        self.policy.check(pool.status, PoolStatus::Emergency)?;

        let old_status = pool.set_status(PoolStatus::Emergency);
        let audit = audit_entry(
            &admin,
            AdminActionKind::EmergencyAction,
            TargetType::Pool,
            pool_id.to_string(),
            ActionDetails::reason(reason)
                .change(old_status.as_str(), PoolStatus::Emergency.as_str())
                .metadata(metadata([("emergencyAction", json!(action))])),
        );

        tracing::warn!(%pool_id, %action, "emergency action taken on pool");
        let write = EntityWrite::UpdatePool(PoolChanges::between(&stored, &pool));
        commit_audited(self.uow.as_ref(), write, audit, None).await?;
        Ok(pool_id)
    }

    async fn toggle_pool_active(
        &self,
        caller: &AuthenticatedCaller,
        pool_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Uuid> {
        let admin = require_admin(self.uow.users().as_ref(), caller).await?;
        let stored = self.load_pool(pool_id).await?;
        let mut pool = stored.clone();

        let was_active = pool.is_active;
        let now_active = pool.toggle_active();
        let (kind, default_reason) = if now_active {
            (AdminActionKind::PoolActivated, REASON_POOL_ACTIVATED)
        } else {
            (AdminActionKind::PoolPaused, REASON_POOL_PAUSED)
        };
        let audit = audit_entry(
            &admin,
            kind,
            TargetType::Pool,
            pool_id.to_string(),
            ActionDetails::reason(reason.unwrap_or_else(|| default_reason.to_string()))
                .change(was_active.to_string(), now_active.to_string())
                .metadata(metadata([
                    ("poolName", json!(pool.name)),
                    ("newActiveStatus", json!(now_active)),
                ])),
        );

        let write = EntityWrite::UpdatePool(PoolChanges::between(&stored, &pool));
        commit_audited(self.uow.as_ref(), write, audit, None).await?;
        Ok(pool_id)
    }

    async fn get_pool(&self, pool_id: Uuid) -> AppResult<Pool> {
        self.load_pool(pool_id).await
    }

    async fn list_pools(&self) -> AppResult<Vec<Pool>> {
        self.uow.pools().list_public().await
    }
}
