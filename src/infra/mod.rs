//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Repositories per collection
//! - Unit of Work, the atomic write path for admin mutations

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, MigrationState, Migrator};
pub use repositories::{
    AdminActionRepository, AdminActionStore, NotificationRepository, NotificationStore,
    PoolRepository, PoolStore, SettingRepository, SettingStore, UserRepository, UserStore,
};
pub use unit_of_work::{ChangeSet, EntityWrite, Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAdminActionRepository, MockNotificationRepository, MockPoolRepository,
    MockSettingRepository, MockUserRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
