//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdminError;
use crate::realtime::{ConnectionState, EntriesSnapshot, EventCountsSnapshot};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client pushed event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// payload of a `command` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Open the live entries table at `page` and mark entries as viewed.
    WatchEntries {
        /// 1-based page, 1 when omitted.
        #[serde(default = "first_page")]
        page: u64,
    },
    /// Jump the entries table to `page`.
    GotoPage {
        /// 1-based page.
        page: u64,
    },
    /// Next entries page.
    NextPage,
    /// Previous entries page.
    PrevPage,
    /// Open the dashboard: participant counts and the unseen-entries badge.
    WatchDashboard,
    /// Close every live view of this connection.
    Unwatch,
}

const fn first_page() -> u64 {
    1
}

/// Live view a connection-state event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// The entries table.
    Entries,
    /// The dashboard counts.
    Dashboard,
}

/// Severity of a [`WsEvent::Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the admin should know about.
    Error,
}

/// Events pushed by the server, carried in the payload of an `event`
/// message as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WsEvent {
    /// Current state of the entries table.
    EntriesSnapshot(EntriesSnapshot),
    /// Current dashboard participant counts.
    EventCounts(EventCountsSnapshot),
    /// Entries inserted since the admin last viewed the table.
    UnseenCount {
        /// Unseen entries.
        count: u64,
    },
    /// Connection state of a live view.
    ConnectionState {
        /// The view.
        view: ViewKind,
        /// Its state.
        state: ConnectionState,
    },
    /// One-off message for the admin.
    Notice {
        /// Severity.
        level: NoticeLevel,
        /// Text to show.
        message: String,
    },
}

impl WsEvent {
    /// Wire name of the event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EntriesSnapshot(_) => "entries_snapshot",
            Self::EventCounts(_) => "event_counts",
            Self::UnseenCount { .. } => "unseen_count",
            Self::ConnectionState { .. } => "connection_state",
            Self::Notice { .. } => "notice",
        }
    }
}

impl WsMessage {
    /// Wraps a pushed event.
    #[must_use]
    pub fn event(event: &WsEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload: serde_json::to_value(event).unwrap_or_default(),
        }
    }

    /// Answers the command with id `id`.
    #[must_use]
    pub fn response(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// An error reply with a numeric code.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u32, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }

    /// An error reply carrying an [`AdminError`]'s code and message.
    #[must_use]
    pub fn from_error(id: impl Into<String>, error: &AdminError) -> Self {
        Self::error(id, error.error_code(), error.to_string())
    }

    /// Serializes the message for a text frame.
    #[must_use]
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
