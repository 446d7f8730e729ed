//! This module defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page size to use when a request does not specify one.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
        }
    }
}

/// Metadata describing a page slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// The 1-based page number the slice came from.
    pub page: u64,
    /// The page size used for the slice.
    pub limit: u64,
    /// How many items the whole collection holds.
    pub total: u64,
    /// How many pages the collection spans (ceiling division).
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

/// Slice `items` into the 1-based page `page` of size `page_size`.
///
/// A page number of zero or less is clamped to 1. A page past the end of the
/// collection yields an empty slice, not an error. A page size of zero is
/// treated as 1.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: u64) -> (Vec<T>, PageInfo) {
    let page = page.max(1) as u64;
    let page_size = page_size.max(1);

    let total = items.len() as u64;
    let total_pages = total.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let page_items: Vec<T> = items
        .into_iter()
        .skip(start as usize)
        .take(page_size as usize)
        .collect();

    let info = PageInfo {
        page,
        limit: page_size,
        total,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    };

    (page_items, info)
}
