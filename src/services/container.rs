//! Service Container - Centralized service access with parallel execution support.
//!
//! Features:
//! - Centralized access to all application services
//! - Thread-safe concurrent access via Arc
//! - Parallel execution of independent reads

use std::future::Future;
use std::sync::Arc;

use super::{
    AdminManager, AdminService, IdentityVerifier, JwtVerifier, NotificationManager,
    NotificationService, PoolManager, PoolService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn identity(&self) -> Arc<dyn IdentityVerifier>;

    fn pools(&self) -> Arc<dyn PoolService>;

    fn admin(&self) -> Arc<dyn AdminService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn notifications(&self) -> Arc<dyn NotificationService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    identity: Arc<dyn IdentityVerifier>,
    pool_service: Arc<dyn PoolService>,
    admin_service: Arc<dyn AdminService>,
    user_service: Arc<dyn UserService>,
    notification_service: Arc<dyn NotificationService>,
}

impl Services {
    /// Wire every service over one Unit of Work.
    pub fn new<U: UnitOfWork + 'static>(uow: Arc<U>, config: &Config) -> Self {
        Self {
            identity: Arc::new(JwtVerifier::new(config)),
            pool_service: Arc::new(PoolManager::new(uow.clone(), config.transition_policy)),
            admin_service: Arc::new(AdminManager::new(uow.clone(), config.default_page_limit)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            notification_service: Arc::new(NotificationManager::new(
                uow,
                config.default_page_limit,
            )),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        Self::new(Arc::new(Persistence::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn identity(&self) -> Arc<dyn IdentityVerifier> {
        self.identity.clone()
    }

    fn pools(&self) -> Arc<dyn PoolService> {
        self.pool_service.clone()
    }

    fn admin(&self) -> Arc<dyn AdminService> {
        self.admin_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notification_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use futures::future::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    ///
    /// # Example
    /// ```ignore
    /// let (pools, users) = parallel::join2(
    ///     uow.pools().list(),
    ///     uow.users().count(),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join(f1, f2).await
    }
}
