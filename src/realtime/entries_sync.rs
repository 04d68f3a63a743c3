//! Live user-entries table: a paginated window kept in step with the
//! change feed.
//!
//! Page 1 is re-read on every change so new rows appear on top. Any other
//! page keeps its rows and only refreshes the total, so the page count
//! follows inserts and deletes without rows shifting under the reader.
//! Inserted ids are marked as new for a short time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::markers::NewEntryMarkers;
use super::table::PaginatedTable;
use crate::domain::{ChangeEvent, ChangeKind, EntryId, UserEntry, WatchedTable};
use crate::error::AdminError;
use crate::store::RangedQuery;

/// What applying a feed item did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Not an entries change.
    Ignored,
    /// The current page rows (and total) were re-read.
    PageReloaded,
    /// Only the total was re-read.
    CountRefreshed,
}

/// Serializable state of an [`EntriesView`].
#[derive(Debug, Clone, Serialize)]
pub struct EntriesSnapshot {
    /// Current 1-based page.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Total rows, once known.
    pub total: Option<u64>,
    /// Number of pages.
    pub total_pages: u64,
    /// Rows of the current page, newest first.
    pub rows: Vec<UserEntry>,
    /// Ids on this page currently marked as new.
    pub new_entry_ids: Vec<EntryId>,
    /// When this snapshot was taken.
    pub generated_at: DateTime<Utc>,
}

/// A live entries table for one connection.
#[derive(Debug)]
pub struct EntriesView<Q: RangedQuery<Row = UserEntry>> {
    table: PaginatedTable<Q>,
    markers: NewEntryMarkers,
}

impl<Q: RangedQuery<Row = UserEntry>> EntriesView<Q> {
    /// Wraps a table and a marker set.
    #[must_use]
    pub const fn new(table: PaginatedTable<Q>, markers: NewEntryMarkers) -> Self {
        Self { table, markers }
    }

    /// The underlying table.
    #[must_use]
    pub const fn table(&self) -> &PaginatedTable<Q> {
        &self.table
    }

    /// Mutable access for page navigation.
    pub const fn table_mut(&mut self) -> &mut PaginatedTable<Q> {
        &mut self.table
    }

    /// The new-entry markers.
    #[must_use]
    pub const fn markers(&self) -> &NewEntryMarkers {
        &self.markers
    }

    /// Applies one change observed at `now`.
    ///
    /// # Errors
    ///
    /// Returns the store error of the re-read; the marker is kept either way.
    pub async fn apply_change(
        &mut self,
        change: &ChangeEvent,
        now: Instant,
    ) -> Result<SyncOutcome, AdminError> {
        if change.table != WatchedTable::UserEntries {
            return Ok(SyncOutcome::Ignored);
        }
        if change.kind == ChangeKind::Insert
            && let Some(id) = change.row_id()
        {
            self.markers.insert(EntryId::from_uuid(id), now);
        }
        if self.table.page() == 1 {
            self.table.reload().await?;
            Ok(SyncOutcome::PageReloaded)
        } else {
            self.table.refresh_count().await?;
            Ok(SyncOutcome::CountRefreshed)
        }
    }

    /// Re-reads the current page and total after changes may have been
    /// missed.
    ///
    /// # Errors
    ///
    /// Returns the store error of the re-read.
    pub async fn resync(&mut self) -> Result<(), AdminError> {
        tracing::debug!(page = self.table.page(), "entries view resync");
        self.table.reload().await
    }

    /// Expires markers; returns `true` if any marker ended.
    pub fn expire_markers(&mut self, now: Instant) -> bool {
        !self.markers.expire(now).is_empty()
    }

    /// When the next marker expires.
    #[must_use]
    pub fn next_marker_deadline(&self) -> Option<Instant> {
        self.markers.next_deadline()
    }

    /// Captures the view for the client.
    #[must_use]
    pub fn snapshot(&self) -> EntriesSnapshot {
        let rows = self.table.rows().to_vec();
        let new_entry_ids = rows
            .iter()
            .map(|row| row.id)
            .filter(|id| self.markers.contains(id))
            .collect();
        EntriesSnapshot {
            page: self.table.page(),
            page_size: self.table.page_size(),
            total: self.table.total(),
            total_pages: self.table.total_pages(),
            rows,
            new_entry_ids,
            generated_at: Utc::now(),
        }
    }
}
