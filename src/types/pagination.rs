//! Offset/limit paging for list endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::MAX_PAGE_LIMIT;

/// Offset/limit query parameters (reusable across all paged list endpoints)
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Number of records to skip
    pub offset: Option<u64>,
    /// Page size, capped at the server maximum
    pub limit: Option<u64>,
}

impl PageParams {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// Requested limit, or `default`, clamped to `1..=MAX_PAGE_LIMIT`
    pub fn limit_or(&self, default: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, MAX_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let params = PageParams::default();
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit_or(50), 50);
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(PageParams::new(0, 10_000).limit_or(50), MAX_PAGE_LIMIT);
        assert_eq!(PageParams::new(0, 0).limit_or(50), 1);
    }
}
