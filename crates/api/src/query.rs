//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for paginated listings.
const DEFAULT_LIMIT: i64 = 50;
/// Upper bound on any requested page size.
const MAX_LIMIT: i64 = 200;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Requested limit clamped to `1..=MAX_LIMIT`.
    pub fn clamp_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Requested offset, never negative.
    pub fn clamp_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let params = PaginationParams::default();
        assert_eq!(params.clamp_limit(), DEFAULT_LIMIT);
        assert_eq!(params.clamp_offset(), 0);

        let params = PaginationParams {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(params.clamp_limit(), MAX_LIMIT);
        assert_eq!(params.clamp_offset(), 0);

        let params = PaginationParams {
            limit: Some(0),
            offset: Some(20),
        };
        assert_eq!(params.clamp_limit(), 1);
        assert_eq!(params.clamp_offset(), 20);
    }
}
