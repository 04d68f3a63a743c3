//! User-entry reads: paginated pages and the CSV export.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::UserEntry;
use crate::error::AdminError;
use crate::realtime::PaginatedTable;
use crate::store::{AdminStore, fetch_all_rows};

/// CSV header row of the export.
pub const CSV_HEADER: &str = "ID,Facebook Username,Facebook Password,First Name,Last Name,Email,Contact No,City,Selected Event,Created At,Updated At";

/// A page of entries with pagination metadata.
#[derive(Debug, Clone)]
pub struct EntriesPage {
    /// Rows, newest first.
    pub rows: Vec<UserEntry>,
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Total rows.
    pub total: u64,
    /// Number of pages.
    pub total_pages: u64,
}

/// A rendered CSV export.
#[derive(Debug, Clone)]
pub struct CsvExport {
    /// Suggested download file name.
    pub filename: String,
    /// Number of data rows.
    pub rows: usize,
    /// CSV text.
    pub body: String,
}

/// Read-only access to user entries.
#[derive(Debug, Clone)]
pub struct EntryService<S> {
    store: S,
    page_size: u64,
    batch_size: u64,
}

impl<S: AdminStore> EntryService<S> {
    /// Creates a new `EntryService`.
    #[must_use]
    pub const fn new(store: S, page_size: u64, batch_size: u64) -> Self {
        Self {
            store,
            page_size,
            batch_size,
        }
    }

    /// Configured page size.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Configured enumeration batch size.
    #[must_use]
    pub const fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// A fresh, unloaded table over all entries.
    #[must_use]
    pub fn table(&self) -> PaginatedTable<S::Entries> {
        PaginatedTable::new(self.store.entries(), self.page_size, self.batch_size)
    }

    /// Loads one page.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] if the count or the rows cannot
    /// be read.
    pub async fn page(&self, page: u64) -> Result<EntriesPage, AdminError> {
        let mut table = self.table();
        table.load_page(page).await?;
        Ok(EntriesPage {
            rows: table.rows().to_vec(),
            page: table.page(),
            page_size: table.page_size(),
            total: table.total().unwrap_or(0),
            total_pages: table.total_pages(),
        })
    }

    /// Renders every entry as CSV, dated `today`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] if any batch fails; nothing is
    /// rendered in that case.
    pub async fn export_csv(&self, today: NaiveDate) -> Result<CsvExport, AdminError> {
        let entries = fetch_all_rows(&self.store.entries(), self.batch_size).await?;
        let body = render_csv(&entries);
        tracing::info!(rows = entries.len(), "entries exported");
        Ok(CsvExport {
            filename: export_filename(today),
            rows: entries.len(),
            body,
        })
    }
}

/// Download name for an export made on `day`.
#[must_use]
pub fn export_filename(day: NaiveDate) -> String {
    format!("users_export_{}.csv", day.format("%Y-%m-%d"))
}

/// Formats a timestamp like `Jan 5, 2025, 03:04 PM`.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Renders the header plus one quoted line per entry, joined by `\n`.
#[must_use]
pub fn render_csv(entries: &[UserEntry]) -> String {
    let mut csv = String::from(CSV_HEADER);
    for entry in entries {
        let fields = [
            entry.id.to_string(),
            entry.fb_username.clone().unwrap_or_default(),
            entry.fb_pass.clone().unwrap_or_default(),
            entry.first_name.clone().unwrap_or_default(),
            entry.last_name.clone().unwrap_or_default(),
            entry.email.clone().unwrap_or_default(),
            entry.contact_no.clone().unwrap_or_default(),
            entry.city.clone().unwrap_or_default(),
            entry.event_title.clone().unwrap_or_default(),
            format_timestamp(entry.created_at),
            format_timestamp(entry.updated_at),
        ];
        let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        let _ = write!(csv, "\n{}", line.join(","));
    }
    csv
}
