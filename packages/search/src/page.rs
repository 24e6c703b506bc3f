//! Page slicing of ordered results.

use serde::{Deserialize, Serialize};

/// One page of an ordered result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Number of items across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Slices page `page` (1-based) of `page_size` items out of `items`.
    /// Pages past the end are empty.
    #[must_use]
    pub fn slice(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let total = items.len();
        let start = page.saturating_sub(1).saturating_mul(page_size);
        let items = items.into_iter().skip(start).take(page_size).collect();
        Self {
            items,
            page,
            page_size,
            total,
        }
    }

    /// Number of pages needed for `total` items.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}
