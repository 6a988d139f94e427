//! Pool governance service
//!
//! Lifecycle management for tokenized money-market pools, with an
//! append-only admin audit trail, per-user notifications and role-based
//! authorization.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Pools, users, audit records, notifications, settings
//! - **services**: Use cases; every admin mutation commits with its audit record
//! - **infra**: Database, repositories and the Unit of Work
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{AuthenticatedCaller, Pool, PoolStatus, User, UserRole};
pub use errors::{AppError, AppResult};
