//! Pagination utilities for facewatch-co

use serde::Deserialize;

/// Largest accepted page size
pub const MAX_PER_PAGE: i64 = 100;

/// Page size used when the caller does not specify one
pub const DEFAULT_PER_PAGE: i64 = 15;

/// Raw pagination query parameters (`?page=&per_page=`)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed, clamped into valid bounds)
    pub page: i64,
    /// Page size (clamped to 1..=100)
    pub per_page: i64,
    /// Total number of items across all pages
    pub total: i64,
    /// Total number of pages (at least 1)
    pub last_page: i64,
    /// Offset for slicing / SQL LIMIT-OFFSET
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// `per_page` is clamped to 1..=100 and `page` into [1, last_page].
pub fn calculate_pagination(total: i64, requested_page: i64, requested_per_page: i64) -> Pagination {
    let per_page = requested_per_page.clamp(1, MAX_PER_PAGE);
    let last_page = ((total + per_page - 1) / per_page).max(1);
    let page = requested_page.clamp(1, last_page);
    let offset = (page - 1) * per_page;

    Pagination {
        page,
        per_page,
        total,
        last_page,
        offset,
    }
}
