//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod admin_action_repository;
mod base;
pub(crate) mod entities;
mod notification_repository;
mod pool_repository;
mod setting_repository;
mod user_repository;

pub(crate) use base::conflict_on_unique;
pub use admin_action_repository::{AdminActionRepository, AdminActionStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use pool_repository::{PoolRepository, PoolStore};
pub use setting_repository::{SettingRepository, SettingStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use admin_action_repository::MockAdminActionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use pool_repository::MockPoolRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use setting_repository::MockSettingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
