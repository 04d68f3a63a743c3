//! Per-event participant counts kept current from participant changes.
//!
//! A change to one event's participants re-reads only that event's exact
//! count and adjusts the running total by the difference, so the total
//! always equals the sum of the per-event counts. Event rows coming and
//! going add or drop their line; a renamed event keeps its count.

use futures_util::future::try_join_all;
use serde::Serialize;

use crate::domain::{ChangeEvent, ChangeKind, Event, EventId, WatchedTable};
use crate::error::AdminError;
use crate::store::{AdminStore, fetch_all_rows, get_accurate_count};

/// Participant count of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventParticipants {
    /// Event id.
    pub event_id: EventId,
    /// Event title.
    pub title: String,
    /// Exact participant count.
    pub participants: u64,
}

/// Serializable dashboard counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCountsSnapshot {
    /// Per-event counts, newest event first.
    pub events: Vec<EventParticipants>,
    /// Sum of all per-event counts.
    pub total_participants: u64,
}

/// Live per-event participant counts.
#[derive(Debug)]
pub struct EventCounts<S: AdminStore> {
    store: S,
    batch_size: u64,
    events: Vec<EventParticipants>,
    total: u64,
}

impl<S: AdminStore> EventCounts<S> {
    /// Creates an empty, unloaded set of counts.
    #[must_use]
    pub const fn new(store: S, batch_size: u64) -> Self {
        Self {
            store,
            batch_size,
            events: Vec::new(),
            total: 0,
        }
    }

    /// Total participants across all events.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Count of one event, if it is known.
    #[must_use]
    pub fn count_of(&self, event_id: EventId) -> Option<u64> {
        self.events
            .iter()
            .find(|e| e.event_id == event_id)
            .map(|e| e.participants)
    }

    /// Reloads every event and its exact count.
    ///
    /// # Errors
    ///
    /// Returns the first store error; the previous counts are kept.
    pub async fn load_all(&mut self) -> Result<(), AdminError> {
        let events: Vec<Event> = fetch_all_rows(&self.store.events(), self.batch_size).await?;
        let counts = try_join_all(events.iter().map(|event| {
            let query = self.store.participants_of(event.id);
            let batch_size = self.batch_size;
            async move { get_accurate_count(&query, batch_size).await }
        }))
        .await?;
        self.events = events
            .into_iter()
            .zip(counts)
            .map(|(event, participants)| EventParticipants {
                event_id: event.id,
                title: event.title,
                participants,
            })
            .collect();
        self.total = self.events.iter().map(|e| e.participants).sum();
        tracing::debug!(events = self.events.len(), total = self.total, "event counts loaded");
        Ok(())
    }

    /// Applies an event or participant change; returns `true` if the
    /// counts moved.
    ///
    /// # Errors
    ///
    /// Returns the store error of the recount.
    pub async fn apply_change(&mut self, change: &ChangeEvent) -> Result<bool, AdminError> {
        match change.table {
            WatchedTable::Participants => self.apply_participant_change(change).await,
            WatchedTable::Events => self.apply_event_change(change).await,
            _ => Ok(false),
        }
    }

    /// A new event is read in with its count, a deleted one drops its line
    /// and its participants from the total, an update refreshes the title.
    async fn apply_event_change(&mut self, change: &ChangeEvent) -> Result<bool, AdminError> {
        let Some(event_id) = change.row_id().map(EventId::from_uuid) else {
            self.load_all().await?;
            return Ok(true);
        };
        match change.kind {
            ChangeKind::Delete => Ok(self.remove_event(event_id)),
            ChangeKind::Insert | ChangeKind::Update if self.count_of(event_id).is_none() => {
                self.load_all().await?;
                Ok(true)
            }
            ChangeKind::Insert | ChangeKind::Update => {
                let title = change
                    .new
                    .as_ref()
                    .and_then(|row| row.get("title"))
                    .and_then(|v| v.as_str());
                let Some(title) = title else {
                    self.load_all().await?;
                    return Ok(true);
                };
                let Some(entry) = self.events.iter_mut().find(|e| e.event_id == event_id) else {
                    return Ok(false);
                };
                if entry.title == title {
                    return Ok(false);
                }
                entry.title = title.to_string();
                Ok(true)
            }
        }
    }

    fn remove_event(&mut self, event_id: EventId) -> bool {
        let Some(pos) = self.events.iter().position(|e| e.event_id == event_id) else {
            return false;
        };
        let removed = self.events.remove(pos);
        self.total = self.total.saturating_sub(removed.participants);
        tracing::debug!(%event_id, participants = removed.participants, "event dropped from counts");
        true
    }

    /// A delete that does not carry its `event_id`, or a change for an event
    /// not loaded yet, reloads everything.
    async fn apply_participant_change(&mut self, change: &ChangeEvent) -> Result<bool, AdminError> {
        let Some(event_id) = change.event_id() else {
            if change.kind == ChangeKind::Delete {
                tracing::debug!("participant delete without event id, recounting all");
                self.load_all().await?;
                return Ok(true);
            }
            return Ok(false);
        };
        if self.count_of(event_id).is_none() {
            self.load_all().await?;
            return Ok(true);
        }
        let mut moved = self.recount(event_id).await?;
        if change.kind == ChangeKind::Update
            && let Some(previous_event) = change
                .old
                .as_ref()
                .and_then(|row| row.get("event_id"))
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<EventId>().ok())
            && previous_event != event_id
            && self.count_of(previous_event).is_some()
        {
            moved |= self.recount(previous_event).await?;
        }
        Ok(moved)
    }

    /// Re-reads one event's exact count and applies the difference to the
    /// total.
    ///
    /// # Errors
    ///
    /// Returns the store error of the count.
    pub async fn recount(&mut self, event_id: EventId) -> Result<bool, AdminError> {
        let fresh =
            get_accurate_count(&self.store.participants_of(event_id), self.batch_size).await?;
        let Some(entry) = self.events.iter_mut().find(|e| e.event_id == event_id) else {
            return Ok(false);
        };
        let previous = entry.participants;
        entry.participants = fresh;
        self.total = self.total.saturating_sub(previous).saturating_add(fresh);
        Ok(previous != fresh)
    }

    /// Captures the counts for the client.
    #[must_use]
    pub fn snapshot(&self) -> EventCountsSnapshot {
        EventCountsSnapshot {
            events: self.events.clone(),
            total_participants: self.total,
        }
    }
}
