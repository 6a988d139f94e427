//! Shared fixtures for integration tests: an in-memory Unit of Work and seed helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use pool_governance::config::Config;
use pool_governance::domain::{
    AdminAction, ApprovalStatus, AuthenticatedCaller, InstrumentType, NewPool, NewUser,
    Notification, Pool, RiskLevel, SystemSetting, TargetType, User, UserChanges, UserRole,
};
use pool_governance::errors::{AppError, AppResult};
use pool_governance::infra::{
    AdminActionRepository, ChangeSet, EntityWrite, NotificationRepository, PoolRepository,
    SettingRepository, UnitOfWork, UserRepository,
};

pub const TEST_SECRET: &str = "integration-test-identity-secret-32+";

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    pools: HashMap<Uuid, Pool>,
    actions: Vec<AdminAction>,
    notifications: HashMap<Uuid, Notification>,
    settings: HashMap<String, SystemSetting>,
}

/// In-memory persistence. `commit` applies a change set under one lock,
/// so a change set is either fully visible or not at all.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn seed_user(&self, subject: &str, role: UserRole) -> User {
        let mut user = User::new(NewUser {
            subject: subject.to_string(),
            email: format!("{}@example.com", subject),
            name: Some(subject.to_string()),
            image: None,
            wallet_address: None,
        });
        user.role = role;
        self.with(|s| s.users.insert(user.id, user.clone()));
        user
    }

    pub fn deactivate(&self, user_id: Uuid) {
        self.with(|s| {
            if let Some(user) = s.users.get_mut(&user_id) {
                user.is_active = false;
            }
        });
    }

    pub fn pool(&self, id: Uuid) -> Pool {
        self.with(|s| s.pools[&id].clone())
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.with(|s| s.users.get(&id).cloned())
    }

    pub fn user_count(&self) -> usize {
        self.with(|s| s.users.len())
    }

    pub fn pool_count(&self) -> usize {
        self.with(|s| s.pools.len())
    }

    /// Audit records in insertion order
    pub fn actions(&self) -> Vec<AdminAction> {
        self.with(|s| s.actions.clone())
    }

    pub fn all_notifications(&self) -> Vec<Notification> {
        self.with(|s| s.notifications.values().cloned().collect())
    }

    pub fn notification(&self, id: Uuid) -> Option<Notification> {
        self.with(|s| s.notifications.get(&id).cloned())
    }

    pub fn setting(&self, key: &str) -> Option<SystemSetting> {
        self.with(|s| s.settings.get(key).cloned())
    }

    pub fn put_notification(&self, notification: Notification) {
        self.with(|s| s.notifications.insert(notification.id, notification));
    }

    pub fn put_pool(&self, pool: Pool) {
        self.with(|s| s.pools.insert(pool.id, pool));
    }
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

fn page<T>(items: Vec<T>, offset: u64, limit: u64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.with(|s| s.users.get(&id).cloned()))
    }

    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<User>> {
        Ok(self.with(|s| s.users.values().find(|u| u.subject == subject).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.with(|s| s.users.values().find(|u| u.email == email).cloned()))
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> AppResult<Option<User>> {
        Ok(self.with(|s| {
            s.users
                .values()
                .find(|u| u.wallet_address.as_deref() == Some(wallet_address))
                .cloned()
        }))
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>> {
        Ok(self.with(|s| ids.iter().filter_map(|id| s.users.get(id).cloned()).collect()))
    }

    async fn insert(&self, user: User) -> AppResult<User> {
        self.with(|s| {
            let taken = s.users.values().any(|u| {
                u.subject == user.subject
                    || u.email == user.email
                    || (user.wallet_address.is_some() && u.wallet_address == user.wallet_address)
            });
            if taken {
                return Err(AppError::conflict("User already exists"));
            }
            s.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    async fn update(&self, changes: UserChanges) -> AppResult<User> {
        self.with(|s| match s.users.get_mut(&changes.id) {
            Some(user) => {
                changes.apply_to(user);
                Ok(user.clone())
            }
            None => Err(AppError::not_found("User")),
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.with(|s| {
            s.users
                .remove(&id)
                .map(|_| {
                    s.notifications.retain(|_, n| n.user_id != id);
                })
                .ok_or_else(|| AppError::not_found("User"))
        })
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users: Vec<User> = self.with(|s| s.users.values().cloned().collect());
        Ok(newest_first(users, |u: &User| u.created_at))
    }

    async fn list_admins(&self) -> AppResult<Vec<User>> {
        let users: Vec<User> = self.with(|s| s.users.values().filter(|u| u.is_admin()).cloned().collect());
        Ok(newest_first(users, |u: &User| u.created_at))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.with(|s| s.users.len() as u64))
    }
}

#[async_trait]
impl PoolRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Pool>> {
        Ok(self.with(|s| s.pools.get(&id).cloned()))
    }

    async fn find_by_contract(&self, contract_address: &str) -> AppResult<Option<Pool>> {
        Ok(self.with(|s| {
            s.pools
                .values()
                .find(|p| p.contract_address == contract_address)
                .cloned()
        }))
    }

    async fn list(&self) -> AppResult<Vec<Pool>> {
        let pools: Vec<Pool> = self.with(|s| s.pools.values().cloned().collect());
        Ok(newest_first(pools, |p: &Pool| p.created_at))
    }

    async fn list_by_approval(&self, status: ApprovalStatus) -> AppResult<Vec<Pool>> {
        let pools: Vec<Pool> = self.with(|s| {
            s.pools
                .values()
                .filter(|p| p.approval_status == status)
                .cloned()
                .collect()
        });
        Ok(newest_first(pools, |p: &Pool| p.created_at))
    }

    async fn list_public(&self) -> AppResult<Vec<Pool>> {
        let pools: Vec<Pool> = self.with(|s| {
            s.pools
                .values()
                .filter(|p| p.approval_status == ApprovalStatus::Approved && p.is_active)
                .cloned()
                .collect()
        });
        Ok(newest_first(pools, |p: &Pool| p.created_at))
    }

    async fn insert(&self, pool: Pool) -> AppResult<Pool> {
        self.with(|s| insert_pool(s, pool.clone()))?;
        Ok(pool)
    }
}

fn insert_pool(state: &mut State, pool: Pool) -> AppResult<()> {
    if state
        .pools
        .values()
        .any(|p| p.contract_address == pool.contract_address)
    {
        return Err(AppError::conflict("Contract address already registered"));
    }
    state.pools.insert(pool.id, pool);
    Ok(())
}

#[async_trait]
impl AdminActionRepository for MemoryStore {
    async fn list_page(&self, offset: u64, limit: u64) -> AppResult<Vec<AdminAction>> {
        // Insertion order breaks created_at ties
        let actions: Vec<AdminAction> = self.with(|s| s.actions.iter().rev().cloned().collect());
        Ok(page(actions, offset, limit))
    }

    async fn list_for_target(
        &self,
        target_type: TargetType,
        target_id: String,
    ) -> AppResult<Vec<AdminAction>> {
        Ok(self.with(|s| {
            s.actions
                .iter()
                .rev()
                .filter(|a| a.target_type == target_type && a.target_id == target_id)
                .cloned()
                .collect()
        }))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self.with(|s| s.notifications.get(&id).cloned()))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<Notification>> {
        let owned: Vec<Notification> = self.with(|s| {
            s.notifications
                .values()
                .filter(|n| n.user_id == user_id)
                .cloned()
                .collect()
        });
        Ok(page(
            newest_first(owned, |n: &Notification| n.created_at),
            offset,
            limit,
        ))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64> {
        Ok(self.with(|s| {
            s.notifications
                .values()
                .filter(|n| n.user_id == user_id && !n.is_read)
                .count() as u64
        }))
    }

    async fn insert(&self, notification: Notification) -> AppResult<Notification> {
        self.with(|s| s.notifications.insert(notification.id, notification.clone()));
        Ok(notification)
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<()> {
        self.with(|s| match s.notifications.get_mut(&id) {
            Some(n) => {
                n.is_read = true;
                Ok(())
            }
            None => Err(AppError::not_found("Notification")),
        })
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        Ok(self.with(|s| {
            let mut changed = 0;
            for n in s.notifications.values_mut() {
                if n.user_id == user_id && !n.is_read {
                    n.is_read = true;
                    changed += 1;
                }
            }
            changed
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.with(|s| {
            s.notifications
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| AppError::not_found("Notification"))
        })
    }
}

#[async_trait]
impl SettingRepository for MemoryStore {
    async fn find_by_key(&self, key: &str) -> AppResult<Option<SystemSetting>> {
        Ok(self.with(|s| s.settings.get(key).cloned()))
    }

    async fn list(&self) -> AppResult<Vec<SystemSetting>> {
        let mut settings: Vec<SystemSetting> = self.with(|s| s.settings.values().cloned().collect());
        settings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(settings)
    }
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(self.clone())
    }

    fn pools(&self) -> Arc<dyn PoolRepository> {
        Arc::new(self.clone())
    }

    fn admin_actions(&self) -> Arc<dyn AdminActionRepository> {
        Arc::new(self.clone())
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        Arc::new(self.clone())
    }

    fn settings(&self) -> Arc<dyn SettingRepository> {
        Arc::new(self.clone())
    }

    async fn commit(&self, changes: ChangeSet) -> AppResult<()> {
        self.with(|s| -> AppResult<()> {
            match changes.write {
                EntityWrite::InsertPool(pool) => insert_pool(s, pool)?,
                EntityWrite::UpdatePool(update) => {
                    let pool = s
                        .pools
                        .get_mut(&update.id)
                        .ok_or_else(|| AppError::not_found("Pool"))?;
                    update.apply_to(pool);
                }
                EntityWrite::UpdateUser(update) => {
                    let user = s
                        .users
                        .get_mut(&update.id)
                        .ok_or_else(|| AppError::not_found("User"))?;
                    update.apply_to(user);
                }
                EntityWrite::InsertSetting(setting) | EntityWrite::UpdateSetting(setting) => {
                    s.settings.insert(setting.key.clone(), setting);
                }
            }
            s.actions.push(changes.audit);
            if let Some(notification) = changes.notification {
                s.notifications.insert(notification.id, notification);
            }
            Ok(())
        })
    }
}

pub fn caller(user: &User) -> AuthenticatedCaller {
    AuthenticatedCaller::new(user.subject.clone()).with_email(user.email.clone())
}

pub fn config() -> Config {
    Config::builder(TEST_SECRET).build().unwrap()
}

/// A valid DISCOUNTED pool spec with the given contract address
pub fn discounted_pool(contract: &str) -> NewPool {
    let epoch_end = Utc::now() + Duration::days(30);
    NewPool {
        contract_address: contract.to_string(),
        manager_address: "0x1111111111111111111111111111111111111111".to_string(),
        escrow_address: "0x2222222222222222222222222222222222222222".to_string(),
        name: "6M Treasury Bill".to_string(),
        symbol: Some("TB6M".to_string()),
        asset: Some("USDC".to_string()),
        issuer: Some("US Treasury".to_string()),
        description: Some("Six month discounted bill".to_string()),
        risk_level: Some(RiskLevel::Low),
        instrument_type: InstrumentType::Discounted,
        target_raise: "1000000".to_string(),
        min_investment: Some("100".to_string()),
        discount_rate: Some(500),
        coupon_rates: Vec::new(),
        coupon_dates: Vec::new(),
        epoch_end_time: epoch_end,
        maturity_date: epoch_end + Duration::days(180),
    }
}
