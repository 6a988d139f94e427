//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! Every entry point takes the [`AuthenticatedCaller`](crate::domain::AuthenticatedCaller)
//! explicitly. Admin mutations are committed through the Unit of Work
//! together with their audit record.

mod access;
mod admin_service;
mod audit;
pub mod container;
mod identity;
mod notification_service;
mod pool_service;
mod user_service;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use admin_service::{AdminManager, AdminService, DashboardStats};
pub use identity::{IdentityClaims, IdentityVerifier, JwtVerifier};
pub use notification_service::{NotificationManager, NotificationService};
pub use pool_service::{PoolManager, PoolService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use identity::MockIdentityVerifier;
