//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, UnitOfWork};
use crate::services::{ServiceContainer, Services};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Service container
    pub services: Arc<dyn ServiceContainer>,
    /// Database handle for health checks; absent when services run on another store
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state from a database connection and config.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            services: Arc::new(container),
            database: Some(database),
        }
    }

    /// Create application state over any Unit of Work implementation.
    pub fn with_unit_of_work<U: UnitOfWork + 'static>(uow: Arc<U>, config: &Config) -> Self {
        Self {
            services: Arc::new(Services::new(uow, config)),
            database: None,
        }
    }
}
