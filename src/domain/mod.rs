//! Domain layer - Core business entities and logic
//!
//! Pools and their lifecycle, users and roles, audit records,
//! notifications and platform settings. Independent of storage and transport.

pub mod admin_action;
pub mod caller;
pub mod notification;
pub mod pool;
pub mod setting;
pub mod user;

pub use admin_action::{ActionDetails, AdminAction, AdminActionKind, AdminActionView, TargetType};
pub use caller::AuthenticatedCaller;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use pool::{
    parse_amount, ApprovalStatus, InstrumentType, NewPool, Pool, PoolChanges, PoolStatus,
    PoolWithActors, RiskLevel, TransitionPolicy,
};
pub use setting::SystemSetting;
pub use user::{
    is_wallet_address, AdminAccess, NewUser, SignInProfile, User, UserChanges, UserResponse,
    UserRole, UserSummary,
};
