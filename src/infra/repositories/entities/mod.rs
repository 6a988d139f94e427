//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Enum columns are stored as their wire spelling and parsed back on load.

pub mod admin_action;
pub mod notification;
pub mod pool;
pub mod system_setting;
pub mod user;
