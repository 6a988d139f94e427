//! Admin service - role management, system settings and admin read models.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::access::{require_admin, require_super_admin};
use super::audit::{audit_entry, commit_audited};
use super::container::parallel;
use crate::domain::{
    parse_amount, ActionDetails, AdminAction, AdminActionKind, AdminActionView, ApprovalStatus,
    AuthenticatedCaller, Pool, PoolStatus, PoolWithActors, SystemSetting, TargetType, User,
    UserChanges, UserRole, UserSummary,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{EntityWrite, UnitOfWork};
use crate::types::PageParams;

/// Aggregate platform figures for the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_pools: u64,
    /// Pools with the activity gate open
    pub active_pools: u64,
    pub total_users: u64,
    pub pending_approvals: u64,
    /// Pool count per status, every status present
    pub status_counts: BTreeMap<String, u64>,
    /// Exact decimal sum of `totalRaised` across all pools
    pub total_value_locked: String,
}

impl DashboardStats {
    /// Aggregate over a snapshot of pools. Unparsable amounts are skipped.
    pub fn from_pools(pools: &[Pool], total_users: u64) -> Self {
        let mut status_counts: BTreeMap<String, u64> = PoolStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();
        let mut total_value_locked = Decimal::ZERO;

        for pool in pools {
            *status_counts
                .entry(pool.status.as_str().to_string())
                .or_default() += 1;

            match parse_amount(&pool.total_raised) {
                Some(amount) => total_value_locked += amount,
                None => tracing::warn!(
                    pool_id = %pool.id,
                    total_raised = %pool.total_raised,
                    "skipping unparsable amount in value locked"
                ),
            }
        }

        Self {
            total_pools: pools.len() as u64,
            active_pools: pools.iter().filter(|p| p.is_active).count() as u64,
            total_users,
            pending_approvals: pools
                .iter()
                .filter(|p| p.approval_status == ApprovalStatus::Pending)
                .count() as u64,
            status_counts,
            total_value_locked: total_value_locked.normalize().to_string(),
        }
    }
}

/// Admin service trait for dependency injection.
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Change a user's role. Promoting to SUPER_ADMIN requires a SUPER_ADMIN caller.
    async fn update_role(
        &self,
        caller: &AuthenticatedCaller,
        target_id: Uuid,
        role: UserRole,
        permissions: Option<Vec<String>>,
    ) -> AppResult<Uuid>;

    /// Upsert a setting by key (SUPER_ADMIN only)
    async fn update_system_setting(
        &self,
        caller: &AuthenticatedCaller,
        key: String,
        value: Value,
        description: Option<String>,
    ) -> AppResult<Uuid>;

    async fn get_system_settings(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<SystemSetting>>;

    async fn get_dashboard_stats(&self, caller: &AuthenticatedCaller) -> AppResult<DashboardStats>;

    async fn get_pending_approvals(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<PoolWithActors>>;

    async fn get_all_pools_for_admin(
        &self,
        caller: &AuthenticatedCaller,
    ) -> AppResult<Vec<PoolWithActors>>;

    /// Audit log page, newest first
    async fn get_admin_actions(
        &self,
        caller: &AuthenticatedCaller,
        page: PageParams,
    ) -> AppResult<Vec<AdminActionView>>;

    /// Every audit record about one entity, newest first
    async fn get_target_history(
        &self,
        caller: &AuthenticatedCaller,
        target_type: TargetType,
        target_id: String,
    ) -> AppResult<Vec<AdminActionView>>;

    async fn list_users(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<User>>;

    async fn list_admins(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<User>>;

    async fn get_user_by_email(&self, caller: &AuthenticatedCaller, email: &str) -> AppResult<User>;

    async fn get_user_by_wallet(&self, caller: &AuthenticatedCaller, wallet: &str) -> AppResult<User>;
}

/// Concrete implementation of AdminService using Unit of Work.
pub struct AdminManager<U: UnitOfWork> {
    uow: Arc<U>,
    default_page_limit: u64,
}

impl<U: UnitOfWork> AdminManager<U> {
    pub fn new(uow: Arc<U>, default_page_limit: u64) -> Self {
        Self {
            uow,
            default_page_limit,
        }
    }

    /// Display fields for a set of actor ids
    async fn summaries(&self, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, UserSummary>> {
        let mut ids = ids;
        ids.sort_unstable();
        ids.dedup();

        let users = self.uow.users().find_many(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u.summary())).collect())
    }

    async fn with_actors(&self, pools: Vec<Pool>) -> AppResult<Vec<PoolWithActors>> {
        let ids = pools
            .iter()
            .flat_map(|p| std::iter::once(p.created_by).chain(p.approved_by))
            .collect();
        let actors = self.summaries(ids).await?;

        Ok(pools
            .into_iter()
            .map(|pool| PoolWithActors {
                creator: actors.get(&pool.created_by).cloned(),
                approver: pool.approved_by.and_then(|id| actors.get(&id).cloned()),
                pool,
            })
            .collect())
    }

    async fn with_admins(&self, actions: Vec<AdminAction>) -> AppResult<Vec<AdminActionView>> {
        let admins = self
            .summaries(actions.iter().map(|a| a.admin_id).collect())
            .await?;

        Ok(actions
            .into_iter()
            .map(|action| AdminActionView {
                admin: admins.get(&action.admin_id).cloned(),
                action,
            })
            .collect())
    }
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminManager<U> {
    async fn update_role(
        &self,
        caller: &AuthenticatedCaller,
        target_id: Uuid,
        role: UserRole,
        permissions: Option<Vec<String>>,
    ) -> AppResult<Uuid> {
        let users = self.uow.users();
        let admin = require_admin(users.as_ref(), caller).await?;
        if role.is_super_admin() && !admin.role.is_super_admin() {
            tracing::warn!(admin_id = %admin.id, %target_id, "blocked promotion to SUPER_ADMIN");
            return Err(AppError::unauthorized("Super admin access required"));
        }

        let stored = users
            .find_by_id(target_id)
            .await?
            .ok_or_not_found("Target user")?;
        let mut target = stored.clone();
        let old_role = target.role;
        target.update_role(role, permissions);

        let audit = audit_entry(
            &admin,
            AdminActionKind::UserRoleChanged,
            TargetType::User,
            target_id.to_string(),
            ActionDetails::reason(format!("Role changed from {} to {}", old_role, role))
                .change(old_role.as_str(), role.as_str()),
        );

        let write = EntityWrite::UpdateUser(UserChanges::between(&stored, &target));
        commit_audited(self.uow.as_ref(), write, audit, None).await?;
        Ok(target_id)
    }

    async fn update_system_setting(
        &self,
        caller: &AuthenticatedCaller,
        key: String,
        value: Value,
        description: Option<String>,
    ) -> AppResult<Uuid> {
        let admin = require_super_admin(self.uow.users().as_ref(), caller).await?;
        if key.trim().is_empty() {
            return Err(AppError::validation("Setting key is required"));
        }

        let existing = self.uow.settings().find_by_key(&key).await?;
        let (write, old_value, setting_id) = match existing {
            Some(mut setting) => {
                let old_value = setting.value.to_string();
                setting.patch(value.clone(), description, admin.id);
                let id = setting.id;
                (EntityWrite::UpdateSetting(setting), Some(old_value), id)
            }
            None => {
                let setting = SystemSetting::new(key.clone(), value.clone(), description, admin.id);
                let id = setting.id;
                (EntityWrite::InsertSetting(setting), None, id)
            }
        };

        let details = ActionDetails {
            old_value,
            new_value: Some(value.to_string()),
            reason: Some(format!("Setting {} updated", key)),
            metadata: None,
        };
        let audit = audit_entry(
            &admin,
            AdminActionKind::SystemSettingUpdated,
            TargetType::SystemSetting,
            key,
            details,
        );

        commit_audited(self.uow.as_ref(), write, audit, None).await?;
        Ok(setting_id)
    }

    async fn get_system_settings(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<SystemSetting>> {
        require_super_admin(self.uow.users().as_ref(), caller).await?;
        self.uow.settings().list().await
    }

    async fn get_dashboard_stats(&self, caller: &AuthenticatedCaller) -> AppResult<DashboardStats> {
        require_admin(self.uow.users().as_ref(), caller).await?;

        let pools = self.uow.pools();
        let users = self.uow.users();
        let (pools, total_users) = parallel::join2(pools.list(), users.count()).await?;

        Ok(DashboardStats::from_pools(&pools, total_users))
    }

    async fn get_pending_approvals(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<PoolWithActors>> {
        require_admin(self.uow.users().as_ref(), caller).await?;
        let pools = self
            .uow
            .pools()
            .list_by_approval(ApprovalStatus::Pending)
            .await?;
        self.with_actors(pools).await
    }

    async fn get_all_pools_for_admin(
        &self,
        caller: &AuthenticatedCaller,
    ) -> AppResult<Vec<PoolWithActors>> {
        require_admin(self.uow.users().as_ref(), caller).await?;
        let pools = self.uow.pools().list().await?;
        self.with_actors(pools).await
    }

    async fn get_admin_actions(
        &self,
        caller: &AuthenticatedCaller,
        page: PageParams,
    ) -> AppResult<Vec<AdminActionView>> {
        require_admin(self.uow.users().as_ref(), caller).await?;

        let actions = self
            .uow
            .admin_actions()
            .list_page(page.offset(), page.limit_or(self.default_page_limit))
            .await?;
        self.with_admins(actions).await
    }

    async fn get_target_history(
        &self,
        caller: &AuthenticatedCaller,
        target_type: TargetType,
        target_id: String,
    ) -> AppResult<Vec<AdminActionView>> {
        require_admin(self.uow.users().as_ref(), caller).await?;

        let actions = self
            .uow
            .admin_actions()
            .list_for_target(target_type, target_id)
            .await?;
        self.with_admins(actions).await
    }

    async fn list_users(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<User>> {
        require_admin(self.uow.users().as_ref(), caller).await?;
        self.uow.users().list().await
    }

    async fn list_admins(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<User>> {
        require_admin(self.uow.users().as_ref(), caller).await?;
        self.uow.users().list_admins().await
    }

    async fn get_user_by_email(&self, caller: &AuthenticatedCaller, email: &str) -> AppResult<User> {
        let users = self.uow.users();
        require_admin(users.as_ref(), caller).await?;
        users.find_by_email(email).await?.ok_or_not_found("User")
    }

    async fn get_user_by_wallet(&self, caller: &AuthenticatedCaller, wallet: &str) -> AppResult<User> {
        let users = self.uow.users();
        require_admin(users.as_ref(), caller).await?;
        users.find_by_wallet(wallet).await?.ok_or_not_found("User")
    }
}
