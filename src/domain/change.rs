//! Row-level change notifications.
//!
//! Every insert, update or delete on a watched table becomes a
//! [`ChangeEvent`], either published by the admin services after their own
//! writes or decoded from a PostgreSQL `NOTIFY` sent by a table trigger.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventId;

/// Tables whose changes are broadcast on the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedTable {
    /// `events`
    Events,
    /// `prizes`
    Prizes,
    /// `participants`
    Participants,
    /// `user_entries`
    UserEntries,
}

impl WatchedTable {
    /// Returns the SQL table name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Prizes => "prizes",
            Self::Participants => "participants",
            Self::UserEntries => "user_entries",
        }
    }
}

impl fmt::Display for WatchedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

/// One row-level change.
///
/// `new` is present for inserts and updates, `old` for updates and
/// deletes. Both hold the row as a JSON object keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Table the row belongs to.
    pub table: WatchedTable,
    /// What happened to the row.
    #[serde(rename = "event_type")]
    pub kind: ChangeKind,
    /// Row after the change.
    #[serde(default)]
    pub new: Option<serde_json::Value>,
    /// Row before the change.
    #[serde(default)]
    pub old: Option<serde_json::Value>,
    /// Commit time reported by the source.
    #[serde(default = "Utc::now")]
    pub committed_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Builds an insert notification.
    #[must_use]
    pub fn insert(table: WatchedTable, new: serde_json::Value) -> Self {
        Self {
            table,
            kind: ChangeKind::Insert,
            new: Some(new),
            old: None,
            committed_at: Utc::now(),
        }
    }

    /// Builds an update notification.
    #[must_use]
    pub fn update(table: WatchedTable, old: serde_json::Value, new: serde_json::Value) -> Self {
        Self {
            table,
            kind: ChangeKind::Update,
            new: Some(new),
            old: Some(old),
            committed_at: Utc::now(),
        }
    }

    /// Builds a delete notification.
    #[must_use]
    pub fn delete(table: WatchedTable, old: serde_json::Value) -> Self {
        Self {
            table,
            kind: ChangeKind::Delete,
            new: None,
            old: Some(old),
            committed_at: Utc::now(),
        }
    }

    /// Returns a column value, preferring the new row image.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&serde_json::Value> {
        self.new
            .as_ref()
            .and_then(|row| row.get(name))
            .filter(|v| !v.is_null())
            .or_else(|| {
                self.old
                    .as_ref()
                    .and_then(|row| row.get(name))
                    .filter(|v| !v.is_null())
            })
    }

    /// Returns the changed row's `id` column as a UUID.
    #[must_use]
    pub fn row_id(&self) -> Option<uuid::Uuid> {
        self.column("id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }

    /// Returns the `event_id` column, for prize and participant rows.
    #[must_use]
    pub fn event_id(&self) -> Option<EventId> {
        self.column("event_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_trigger_payload() {
        let id = uuid::Uuid::new_v4();
        let payload = json!({
            "table": "user_entries",
            "event_type": "INSERT",
            "new": { "id": id.to_string(), "city": "Lisbon" },
            "old": null,
            "committed_at": "2025-04-01T12:00:00Z"
        });
        let Ok(change) = serde_json::from_value::<ChangeEvent>(payload) else {
            panic!("payload should decode");
        };
        assert_eq!(change.table, WatchedTable::UserEntries);
        assert_eq!(change.kind, ChangeKind::Insert);
        assert_eq!(change.row_id(), Some(id));
    }

    #[test]
    fn delete_reads_old_image() {
        let event = EventId::new();
        let change = ChangeEvent::delete(
            WatchedTable::Participants,
            json!({ "id": uuid::Uuid::new_v4().to_string(), "event_id": event.to_string() }),
        );
        assert_eq!(change.event_id(), Some(event));
    }

    #[test]
    fn delete_without_event_column_has_no_event_id() {
        let change = ChangeEvent::delete(
            WatchedTable::Participants,
            json!({ "id": uuid::Uuid::new_v4().to_string() }),
        );
        assert!(change.event_id().is_none());
        assert!(change.row_id().is_some());
    }

    #[test]
    fn serializes_kind_uppercase() {
        let change = ChangeEvent::insert(WatchedTable::Prizes, json!({}));
        let json = serde_json::to_string(&change).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"INSERT\""));
        assert!(json.contains("\"table\":\"prizes\""));
    }
}
