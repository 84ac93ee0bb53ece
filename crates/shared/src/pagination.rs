//! Fixed-size page slicing for list views.
//!
//! Pages are 1-based. Given `n` items and a page size `p` there are
//! `ceil(n / p)` pages and the last page holds the remainder.

use serde::Serialize;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound for a requested page size.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page request after defaults and bounds have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    /// Builds a request from optional query values.
    ///
    /// Missing or zero values fall back to page 1 and the given default size;
    /// the size is capped at `max_per_page`.
    pub fn new(
        page: Option<usize>,
        per_page: Option<usize>,
        default_per_page: usize,
        max_per_page: usize,
    ) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let per_page = per_page
            .filter(|p| *p > 0)
            .unwrap_or(default_per_page)
            .min(max_per_page.max(1));
        Self { page, per_page }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination metadata returned alongside a page of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One page of items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// Slices `items` down to the requested page.
///
/// A page past the end yields an empty `data` with correct totals.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let per_page = request.per_page.max(1);
    let start = (request.page.max(1) - 1).saturating_mul(per_page);

    let data = items.into_iter().skip(start).take(per_page).collect();

    Page {
        data,
        pagination: Pagination {
            page: request.page.max(1),
            per_page,
            total,
            total_pages: page_count(total, per_page),
        },
    }
}
