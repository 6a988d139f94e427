//! HTTP request handlers.

pub mod admin_handler;
pub mod notification_handler;
pub mod pool_handler;
pub mod user_handler;

pub use admin_handler::admin_routes;
pub use notification_handler::notification_routes;
pub use pool_handler::pool_routes;
pub use user_handler::{account_routes, auth_routes};
