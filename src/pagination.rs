//! Page windows for search endpoints.

use serde::{Deserialize, Serialize};

/// Fallback page number when the caller supplies none.
pub const DEFAULT_PAGE: i64 = 1;

/// Fallback page size when the caller supplies none.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Default page settings applied to search requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page served when the request leaves it unset.
    pub page: i64,
    /// Page size used when the request leaves it unset.
    pub per_page: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PaginationConfig {
    /// Resolves a requested page and size, replacing values of zero or
    /// less with the configured defaults.
    #[must_use]
    pub const fn window(self, page: i64, per_page: i64) -> PageWindow {
        PageWindow {
            page: if page > 0 { page } else { self.page },
            per_page: if per_page > 0 { per_page } else { self.per_page },
        }
    }
}

/// Resolved one-based page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// One-based page number.
    pub page: i64,
    /// Rows per page.
    pub per_page: i64,
}

impl PageWindow {
    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(self) -> i64 {
        self.per_page.saturating_mul(self.page.saturating_sub(1))
    }

    /// Number of rows to return.
    #[must_use]
    pub const fn limit(self) -> i64 {
        self.per_page
    }

    /// Selects this window's slice out of an already ordered row set.
    pub fn slice<T: Clone>(self, rows: &[T]) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        rows.iter().skip(skip).take(take).cloned().collect()
    }
}
