//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::PageParams;
pub use response::{CountResponse, IdResponse, NoContent};
