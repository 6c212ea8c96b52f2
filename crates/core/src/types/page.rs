//! Pagination types.

use serde::{Deserialize, Serialize};

/// A request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Maximum number of items on the page.
    pub size: u32,
}

impl PageRequest {
    /// Request page `page` with `size` items per page.
    #[must_use]
    pub const fn of(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// The first page with `size` items.
    #[must_use]
    pub const fn first(size: u32) -> Self {
        Self::of(0, size)
    }

    /// Number of items to skip before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Apply this page to an already sorted slice.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(self.size).unwrap_or(usize::MAX);
        items
            .get(start..)
            .map_or(&[], |rest| rest.get(..size).unwrap_or(rest))
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Create a page.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            request,
            total,
        }
    }

    /// Whether a later page has items.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.request.offset() + (self.items.len() as u64) < self.total
    }

    /// Whether the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
