//! Service layer: business logic orchestration.
//!
//! Services validate input, write through the [`crate::store::AdminStore`],
//! manage images through the [`crate::storage::BlobStore`] and publish the
//! resulting row changes on the [`ChangeBus`].

pub mod auth_service;
pub mod entry_service;
pub mod event_service;
pub mod prize_service;

use serde::Serialize;

use crate::domain::{ChangeBus, ChangeEvent, ChangeKind, WatchedTable};

pub use auth_service::AuthService;
pub use entry_service::{CsvExport, EntriesPage, EntryService};
pub use event_service::{EventSaved, EventService};
pub use prize_service::PrizeService;

/// Publishes a row change made by this process.
fn publish_row<T: Serialize>(
    bus: &ChangeBus,
    table: WatchedTable,
    kind: ChangeKind,
    old: Option<&T>,
    new: Option<&T>,
) {
    let to_json = |row: Option<&T>| row.and_then(|r| serde_json::to_value(r).ok());
    let change = ChangeEvent {
        table,
        kind,
        new: to_json(new),
        old: to_json(old),
        committed_at: chrono::Utc::now(),
    };
    let receivers = bus.publish(change);
    tracing::debug!(%table, ?kind, receivers, "row change published");
}
