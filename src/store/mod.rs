//! Store layer: ranged queries, helpers and the PostgreSQL implementation.
//!
//! [`AdminStore`] is the narrow surface the services and live views need
//! from the data store. The concrete implementation is
//! [`postgres::PgStore`]; tests use an in-memory store.

pub mod models;
pub mod postgres;
pub mod query;

#[cfg(test)]
pub(crate) mod memory;

use std::future::Future;

use crate::domain::{
    AdminAccount, Event, EventFields, EventId, Prize, PrizeFields, PrizeId, UserEntry,
};
use crate::error::AdminError;

pub use postgres::PgStore;
pub use query::{RangedQuery, fetch_all_rows, get_accurate_count};

/// Data store operations used by the admin services.
///
/// Mutations return the affected row so callers can publish change
/// notifications and clean up stored images. `Ok(None)` means the target
/// row does not exist.
pub trait AdminStore: Clone + Send + Sync + 'static {
    /// All user entries, newest first.
    type Entries: RangedQuery<Row = UserEntry> + 'static;
    /// All events, newest first.
    type Events: RangedQuery<Row = Event> + 'static;
    /// Prizes of one event, oldest first.
    type Prizes: RangedQuery<Row = Prize> + 'static;
    /// Participant ids of one event.
    type Participants: RangedQuery<Row = uuid::Uuid> + 'static;

    /// Base query over the user-entries table.
    fn entries(&self) -> Self::Entries;

    /// Base query over the events table.
    fn events(&self) -> Self::Events;

    /// Base query over one event's prizes.
    fn prizes_of(&self, event_id: EventId) -> Self::Prizes;

    /// Base query over one event's participants.
    fn participants_of(&self, event_id: EventId) -> Self::Participants;

    /// Loads one event.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn get_event(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, AdminError>> + Send;

    /// Inserts an event.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn insert_event(
        &self,
        fields: &EventFields,
    ) -> impl Future<Output = Result<Event, AdminError>> + Send;

    /// Overwrites an event's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn update_event(
        &self,
        id: EventId,
        fields: &EventFields,
    ) -> impl Future<Output = Result<Option<Event>, AdminError>> + Send;

    /// Deletes an event; prizes and participants go with it (FK cascade).
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn delete_event(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, AdminError>> + Send;

    /// Inserts a batch of prizes for one event in a single statement.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure; no prize of the
    /// batch is kept in that case.
    fn insert_prizes(
        &self,
        event_id: EventId,
        prizes: &[PrizeFields],
    ) -> impl Future<Output = Result<Vec<Prize>, AdminError>> + Send;

    /// Loads one prize.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn get_prize(
        &self,
        id: PrizeId,
    ) -> impl Future<Output = Result<Option<Prize>, AdminError>> + Send;

    /// Overwrites a prize's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn update_prize(
        &self,
        id: PrizeId,
        fields: &PrizeFields,
    ) -> impl Future<Output = Result<Option<Prize>, AdminError>> + Send;

    /// Deletes a prize.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn delete_prize(
        &self,
        id: PrizeId,
    ) -> impl Future<Output = Result<Option<Prize>, AdminError>> + Send;

    /// Looks up an admin account by username.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] on store failure.
    fn find_admin(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<AdminAccount>, AdminError>> + Send;
}
