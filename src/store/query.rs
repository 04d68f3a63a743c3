//! Ranged queries and the helpers built on them.
//!
//! A [`RangedQuery`] is a base query (table, filters, ordering) that can be
//! read by zero-based inclusive offset bounds and counted. The helpers turn
//! it into "every row" and "exact row count" without relying on any
//! per-request row cap of the backend.

use std::future::Future;

use crate::error::AdminError;

/// Rows per ranged read used by [`fetch_all_rows`] unless configured.
pub const DEFAULT_BATCH_SIZE: u64 = 1000;

/// A base query readable by offset ranges.
///
/// Implementations must return rows in a stable order so that consecutive,
/// non-overlapping ranges concatenate to the full ordered result.
pub trait RangedQuery: Send + Sync {
    /// Row type produced by the query.
    type Row: Send;

    /// Reads rows `from..=to` (zero-based, inclusive).
    ///
    /// # Errors
    ///
    /// Returns an [`AdminError`] if the backend request fails.
    fn fetch_range(
        &self,
        from: u64,
        to: u64,
    ) -> impl Future<Output = Result<Vec<Self::Row>, AdminError>> + Send;

    /// Asks the backend for an exact, head-only row count.
    ///
    /// `Ok(None)` means the backend answered without a count.
    ///
    /// # Errors
    ///
    /// Returns an [`AdminError`] if the backend request fails.
    fn exact_count(&self) -> impl Future<Output = Result<Option<u64>, AdminError>> + Send;
}

/// Returns the inclusive offset bounds of 1-based `page`.
#[must_use]
pub fn page_bounds(page: u64, page_size: u64) -> (u64, u64) {
    let size = page_size.max(1);
    let from = page.max(1).saturating_sub(1).saturating_mul(size);
    (from, from.saturating_add(size - 1))
}

/// Returns `ceil(total / page_size)`.
#[must_use]
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1))
}

/// Reads every row of `query` in batches of `batch_size`.
///
/// Starts at offset 0 and stops at the first batch shorter than
/// `batch_size` (including an empty one).
///
/// # Errors
///
/// The first failing batch aborts the loop; rows read so far are dropped
/// and the error is returned.
pub async fn fetch_all_rows<Q: RangedQuery>(
    query: &Q,
    batch_size: u64,
) -> Result<Vec<Q::Row>, AdminError> {
    let batch = batch_size.max(1);
    let mut rows = Vec::new();
    let mut from = 0_u64;
    loop {
        let page = query.fetch_range(from, from + batch - 1).await?;
        let len = page.len() as u64;
        rows.extend(page);
        if len < batch {
            break;
        }
        from += batch;
    }
    Ok(rows)
}

/// Returns the exact row count of `query`.
///
/// Prefers the backend's head-only count; if that fails or comes back
/// empty, enumerates the rows with [`fetch_all_rows`] and counts them.
///
/// # Errors
///
/// Returns an [`AdminError`] only if the enumeration fallback fails.
pub async fn get_accurate_count<Q: RangedQuery>(
    query: &Q,
    batch_size: u64,
) -> Result<u64, AdminError> {
    match query.exact_count().await {
        Ok(Some(count)) => return Ok(count),
        Ok(None) => tracing::debug!("exact count unavailable, enumerating rows"),
        Err(e) => tracing::warn!(error = %e, "exact count failed, enumerating rows"),
    }
    let rows = fetch_all_rows(query, batch_size).await?;
    Ok(rows.len() as u64)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::store::memory::VecQuery;

    #[tokio::test]
    async fn fetch_all_rows_at_batch_boundaries() {
        for n in [0_u64, 1, 999, 1000, 1001, 2000, 2500] {
            let query = VecQuery::new((0..n).collect());
            let Ok(rows) = fetch_all_rows(&query, DEFAULT_BATCH_SIZE).await else {
                panic!("fetch failed for {n}");
            };
            assert_eq!(rows.len() as u64, n, "row count for {n}");
            assert!(rows.iter().copied().eq(0..n), "order for {n}");
        }
    }

    #[tokio::test]
    async fn exact_multiple_needs_one_trailing_empty_read() {
        let query = VecQuery::new((0..1000_u64).collect());
        let _ = fetch_all_rows(&query, 1000).await;
        assert_eq!(query.range_calls(), 2);

        let query = VecQuery::new((0..1001_u64).collect());
        let _ = fetch_all_rows(&query, 1000).await;
        assert_eq!(query.range_calls(), 2);

        let query = VecQuery::new(Vec::<u64>::new());
        let _ = fetch_all_rows(&query, 1000).await;
        assert_eq!(query.range_calls(), 1);
    }

    #[tokio::test]
    async fn failing_batch_discards_partial_rows() {
        let query = VecQuery::new((0..2500_u64).collect()).fail_range_from(1000);
        let result = fetch_all_rows(&query, 1000).await;
        let Err(AdminError::Persistence(_)) = result else {
            panic!("expected the second batch error to propagate");
        };
    }

    #[tokio::test]
    async fn accurate_count_prefers_exact_count() {
        let query = VecQuery::new((0..10_u64).collect()).with_reported_count(Some(10));
        assert_eq!(get_accurate_count(&query, 1000).await.ok(), Some(10));
        assert_eq!(query.range_calls(), 0);
    }

    #[tokio::test]
    async fn accurate_count_falls_back_on_missing_count() {
        let query = VecQuery::new((0..1234_u64).collect()).with_reported_count(None);
        assert_eq!(get_accurate_count(&query, 1000).await.ok(), Some(1234));
        assert_eq!(query.range_calls(), 2);
    }

    #[tokio::test]
    async fn accurate_count_falls_back_on_count_error() {
        let query = VecQuery::new((0..5_u64).collect()).fail_count();
        assert_eq!(get_accurate_count(&query, 1000).await.ok(), Some(5));
    }

    #[tokio::test]
    async fn pages_concatenate_to_the_full_set() {
        for (n, size) in [(0_u64, 100_u64), (1, 100), (100, 100), (101, 100), (250, 7)] {
            let query = VecQuery::new((0..n).collect());
            let pages = total_pages(n, size);
            let mut seen = Vec::new();
            for page in 1..=pages {
                let (from, to) = page_bounds(page, size);
                let Ok(rows) = query.fetch_range(from, to).await else {
                    panic!("range failed");
                };
                assert!(!rows.is_empty(), "page {page} of {pages} is empty");
                seen.extend(rows);
            }
            assert!(seen.iter().copied().eq(0..n), "n={n} size={size}");
        }
    }

    #[test]
    fn page_math() {
        assert_eq!(page_bounds(1, 100), (0, 99));
        assert_eq!(page_bounds(3, 100), (200, 299));
        assert_eq!(page_bounds(0, 100), (0, 99));
        assert_eq!(total_pages(0, 100), 0);
        assert_eq!(total_pages(100, 100), 1);
        assert_eq!(total_pages(101, 100), 2);
    }
}
