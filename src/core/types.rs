//! Query option and result types shared by the storage port and its adapters

use serde::{Deserialize, Serialize};

/// Page size used when a list query does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 1000;

/// Upper bound on a single page.
pub const MAX_PER_PAGE: u32 = 10_000;

/// Options for reading one record by address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadByAddressOptions {
    /// Pin to this height; `None` returns the latest known record.
    pub height: Option<u64>,
}

impl ReadByAddressOptions {
    pub fn at_height(height: u64) -> Self {
        Self { height: Some(height) }
    }
}

/// Options for paginated list reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadListOptions {
    pub height: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ReadListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_height(mut self, height: u64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// 1-based page with zero or absent normalized to the first page.
    pub fn page(&self) -> u32 {
        match self.page {
            Some(page) if page > 0 => page,
            _ => 1,
        }
    }

    /// Page size with zero or absent normalized to [`DEFAULT_PER_PAGE`].
    pub fn per_page(&self) -> u32 {
        match self.per_page {
            Some(per_page) if per_page > 0 => per_page.min(MAX_PER_PAGE),
            _ => DEFAULT_PER_PAGE,
        }
    }

    /// Row offset for the normalized page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.per_page())
    }

    /// Height filter shared with the matching count query.
    pub fn count_options(&self) -> CountOptions {
        CountOptions { height: self.height }
    }
}

/// Options for aggregate counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountOptions {
    pub height: Option<u64>,
}

/// One page of records together with the total they were drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, options: &ReadListOptions) -> Self {
        Self {
            items,
            total,
            page: options.page(),
            per_page: options.per_page(),
        }
    }

    /// Number of pages needed to cover `total` at this page size.
    pub fn total_pages(&self) -> i64 {
        // deserialized pages may carry a zero size
        let per_page = i64::from(self.per_page.max(1));
        (self.total + per_page - 1) / per_page
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page) < self.total_pages()
    }
}
