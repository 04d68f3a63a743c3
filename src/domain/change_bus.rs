//! Broadcast channel for row changes.
//!
//! [`ChangeBus`] wraps a [`tokio::sync::broadcast`] channel carrying
//! [`ChangeEvent`]s plus a [`tokio::sync::watch`] channel carrying the
//! upstream feed status. Admin services publish their own writes; the
//! PostgreSQL listener publishes everything else and drives the status.

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use super::ChangeEvent;

/// Status of the upstream change feed, as seen by subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// The feed is live and delivering changes.
    Subscribed,
    /// The feed failed.
    ChannelError,
    /// The feed did not become ready in time.
    TimedOut,
    /// The feed was shut down.
    Closed,
}

/// Broadcast bus for [`ChangeEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest changes are dropped for lagging
/// receivers, who are told how many they missed.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
    status: watch::Sender<Option<SubscriptionStatus>>,
}

impl ChangeBus {
    /// Creates a new `ChangeBus` with the given channel capacity.
    ///
    /// The status starts unset: subscribers wait until a source reports
    /// [`SubscriptionStatus::Subscribed`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let (status, _) = watch::channel(None);
        Self { sender, status }
    }

    /// Publishes a change to all subscribers.
    ///
    /// Returns the number of receivers that received the change.
    /// If there are no active receivers, the change is silently dropped.
    pub fn publish(&self, change: ChangeEvent) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    /// Creates a receiver for all future changes.
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Records the upstream feed status and wakes status watchers.
    pub fn set_status(&self, status: SubscriptionStatus) {
        self.status.send_replace(Some(status));
    }

    /// Returns the current upstream feed status, if any was reported.
    #[must_use]
    pub fn status(&self) -> Option<SubscriptionStatus> {
        *self.status.borrow()
    }

    /// Creates a watcher for status transitions.
    #[must_use]
    pub fn status_watcher(&self) -> watch::Receiver<Option<SubscriptionStatus>> {
        self.status.subscribe()
    }

    /// Returns the current number of change receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
