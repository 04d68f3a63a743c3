//! Client-facing connection state derived from the feed status.

use serde::Serialize;

use crate::domain::SubscriptionStatus;

/// Connection state shown next to a live view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Waiting for the feed.
    Connecting,
    /// Live.
    Connected,
    /// The feed timed out or closed.
    Disconnected,
    /// The feed failed.
    Error,
}

impl ConnectionState {
    /// Wire name of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
        }
    }
}

impl From<SubscriptionStatus> for ConnectionState {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Subscribed => Self::Connected,
            SubscriptionStatus::ChannelError => Self::Error,
            SubscriptionStatus::TimedOut | SubscriptionStatus::Closed => Self::Disconnected,
        }
    }
}

/// What a status update changed for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    /// The state differs from before; push it to the client.
    pub changed: bool,
    /// First error of this view; tell the user once.
    pub first_error: bool,
    /// The feed came back after an outage; changes may have been missed.
    pub resumed: bool,
}

/// Tracks one view's connection state.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    state: ConnectionState,
    error_reported: bool,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    /// Starts in [`ConnectionState::Connecting`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
            error_reported: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Applies a feed status.
    pub fn apply(&mut self, status: SubscriptionStatus) -> Transition {
        let next = ConnectionState::from(status);
        let previous = std::mem::replace(&mut self.state, next);
        let first_error = next == ConnectionState::Error && !self.error_reported;
        if first_error {
            self.error_reported = true;
        }
        Transition {
            changed: previous != next,
            first_error,
            resumed: next == ConnectionState::Connected
                && matches!(
                    previous,
                    ConnectionState::Error | ConnectionState::Disconnected
                ),
        }
    }
}
