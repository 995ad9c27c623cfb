//! Shared list-window parameters
//!
//! List endpoints take `skip`/`limit` query parameters with clamped
//! defaults, applied as SQL OFFSET/LIMIT.

use serde::{Deserialize, Serialize};

/// Default number of records returned by a list endpoint.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Hard cap on a single list response.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Window over a list query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl ListWindow {
    /// SQL OFFSET value: non-negative, defaults to 0.
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    /// SQL LIMIT value: clamped to 1..=MAX, defaults to DEFAULT.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let window = ListWindow::default();
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn test_clamping() {
        let window = ListWindow {
            skip: Some(-5),
            limit: Some(0),
        };
        assert_eq!(window.offset(), 0);
        assert_eq!(window.limit(), 1);

        let window = ListWindow {
            skip: Some(40),
            limit: Some(100_000),
        };
        assert_eq!(window.offset(), 40);
        assert_eq!(window.limit(), MAX_LIST_LIMIT);
    }
}
