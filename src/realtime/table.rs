//! Paginated window over a ranged query.

use crate::error::AdminError;
use crate::store::query::{page_bounds, total_pages};
use crate::store::{RangedQuery, get_accurate_count};

/// One page of a [`RangedQuery`] plus its pagination state.
///
/// Pages are 1-based. The total row count is fetched on the first load and
/// refreshed on demand; rows are only re-read when a page is (re)loaded.
#[derive(Debug)]
pub struct PaginatedTable<Q: RangedQuery> {
    query: Q,
    page_size: u64,
    batch_size: u64,
    page: u64,
    total: Option<u64>,
    rows: Vec<Q::Row>,
    loading: bool,
}

impl<Q: RangedQuery> PaginatedTable<Q> {
    /// Creates an unloaded table showing page 1.
    #[must_use]
    pub fn new(query: Q, page_size: u64, batch_size: u64) -> Self {
        Self {
            query,
            page_size: page_size.max(1),
            batch_size,
            page: 1,
            total: None,
            rows: Vec::new(),
            loading: false,
        }
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Total row count, once known.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    /// Number of pages for the known total (0 while unknown or empty).
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total.unwrap_or(0), self.page_size)
    }

    /// Rows of the current page.
    #[must_use]
    pub fn rows(&self) -> &[Q::Row] {
        &self.rows
    }

    /// Returns `true` while a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns `true` if there is a next page and no fetch is running.
    #[must_use]
    pub fn can_next(&self) -> bool {
        !self.loading && self.page < self.total_pages()
    }

    /// Returns `true` if there is a previous page and no fetch is running.
    #[must_use]
    pub const fn can_prev(&self) -> bool {
        !self.loading && self.page > 1
    }

    /// Loads `page`, fetching the total first if it is still unknown.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous page stays displayed.
    pub async fn load_page(&mut self, page: u64) -> Result<(), AdminError> {
        self.loading = true;
        let result = self.fetch_page(page.max(1), self.total.is_none()).await;
        self.loading = false;
        result
    }

    /// Re-reads the total and the current page.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous page stays displayed.
    pub async fn reload(&mut self) -> Result<(), AdminError> {
        self.loading = true;
        let result = self.fetch_page(self.page, true).await;
        self.loading = false;
        result
    }

    /// Moves to the next page; `Ok(false)` when refused.
    ///
    /// # Errors
    ///
    /// Returns the store error of the page load.
    pub async fn next(&mut self) -> Result<bool, AdminError> {
        if !self.can_next() {
            return Ok(false);
        }
        self.load_page(self.page + 1).await.map(|()| true)
    }

    /// Moves to the previous page; `Ok(false)` when refused.
    ///
    /// # Errors
    ///
    /// Returns the store error of the page load.
    pub async fn prev(&mut self) -> Result<bool, AdminError> {
        if !self.can_prev() {
            return Ok(false);
        }
        self.load_page(self.page - 1).await.map(|()| true)
    }

    /// Re-reads only the total row count.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous total is kept.
    pub async fn refresh_count(&mut self) -> Result<(), AdminError> {
        self.total = Some(get_accurate_count(&self.query, self.batch_size).await?);
        Ok(())
    }

    async fn fetch_page(&mut self, page: u64, with_count: bool) -> Result<(), AdminError> {
        let total = if with_count {
            Some(get_accurate_count(&self.query, self.batch_size).await?)
        } else {
            self.total
        };
        let (from, to) = page_bounds(page, self.page_size);
        let rows = self.query.fetch_range(from, to).await?;
        self.total = total;
        self.page = page;
        self.rows = rows;
        tracing::debug!(page, rows = self.rows.len(), total = ?self.total, "table page loaded");
        Ok(())
    }
}
