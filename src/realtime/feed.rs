//! Change feed subscriptions.
//!
//! A [`ChangeFeed`] hands out [`Subscription`]s filtered by table, change
//! kind and an optional column equality. Subscribing resolves only once the
//! upstream feed has reported a status, so a caller can sequence
//! subscriptions by awaiting them in order.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use crate::domain::{ChangeBus, ChangeEvent, ChangeKind, SubscriptionStatus, WatchedTable};

/// Selects which changes a [`Subscription`] yields.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFilter {
    /// Table to watch.
    pub table: WatchedTable,
    /// Only this kind of change, if set.
    pub kind: Option<ChangeKind>,
    /// Only rows whose column equals the value, if set.
    pub column_eq: Option<(String, serde_json::Value)>,
}

impl TableFilter {
    /// Matches every change on `table`.
    #[must_use]
    pub const fn table(table: WatchedTable) -> Self {
        Self {
            table,
            kind: None,
            column_eq: None,
        }
    }

    /// Restricts the filter to one change kind.
    #[must_use]
    pub const fn kind(mut self, kind: ChangeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts the filter to rows with `column = value`.
    #[must_use]
    pub fn column_eq(mut self, column: impl Into<String>, value: serde_json::Value) -> Self {
        self.column_eq = Some((column.into(), value));
        self
    }

    /// Returns `true` if `change` passes the filter.
    #[must_use]
    pub fn matches(&self, change: &ChangeEvent) -> bool {
        if change.table != self.table {
            return false;
        }
        if self.kind.is_some_and(|kind| kind != change.kind) {
            return false;
        }
        match &self.column_eq {
            Some((column, value)) => change.column(column) == Some(value),
            None => true,
        }
    }
}

/// One item read from a [`Subscription`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    /// A change matching the filter.
    Change(ChangeEvent),
    /// The upstream feed status moved.
    Status(SubscriptionStatus),
    /// This many changes were dropped before they could be read.
    Lagged(u64),
}

/// Source of filtered change subscriptions.
pub trait ChangeFeed: Send + Sync {
    /// Opens a subscription and waits until the feed reports ready.
    ///
    /// The returned subscription's [`Subscription::status`] tells whether
    /// the feed came up or why it did not.
    fn subscribe(&self, filter: TableFilter) -> impl Future<Output = Subscription> + Send;
}

/// A live, filtered view of the change bus.
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) releases the
/// underlying receivers.
#[derive(Debug)]
pub struct Subscription {
    filter: TableFilter,
    changes: broadcast::Receiver<ChangeEvent>,
    status_rx: watch::Receiver<Option<SubscriptionStatus>>,
    status: SubscriptionStatus,
    closed: bool,
}

impl Subscription {
    /// Returns the filter this subscription was opened with.
    #[must_use]
    pub const fn filter(&self) -> &TableFilter {
        &self.filter
    }

    /// Returns the last feed status seen by this subscription.
    #[must_use]
    pub const fn status(&self) -> SubscriptionStatus {
        self.status
    }

    /// Waits for the next matching change, status transition or lag notice.
    ///
    /// Returns `None` once the bus is gone. Cancel safe: dropping the
    /// future loses nothing.
    pub async fn next(&mut self) -> Option<FeedItem> {
        if self.closed {
            return None;
        }
        loop {
            tokio::select! {
                received = self.changes.recv() => match received {
                    Ok(change) if self.filter.matches(&change) => {
                        return Some(FeedItem::Change(change));
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        return Some(FeedItem::Lagged(missed));
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Some(self.close());
                    }
                },
                changed = self.status_rx.changed() => {
                    if changed.is_err() {
                        return Some(self.close());
                    }
                    let current = *self.status_rx.borrow_and_update();
                    if let Some(status) = current
                        && status != self.status
                    {
                        self.status = status;
                        return Some(FeedItem::Status(status));
                    }
                }
            }
        }
    }

    /// Tears the subscription down.
    pub fn unsubscribe(self) {
        tracing::debug!(table = %self.filter.table, "feed subscription dropped");
    }

    fn close(&mut self) -> FeedItem {
        self.closed = true;
        self.status = SubscriptionStatus::Closed;
        FeedItem::Status(SubscriptionStatus::Closed)
    }
}

/// [`ChangeFeed`] over the process-wide [`ChangeBus`].
#[derive(Debug, Clone)]
pub struct BusFeed {
    bus: ChangeBus,
    ready_timeout: Duration,
}

impl BusFeed {
    /// Creates a feed that gives up waiting for readiness after
    /// `ready_timeout`.
    #[must_use]
    pub const fn new(bus: ChangeBus, ready_timeout: Duration) -> Self {
        Self { bus, ready_timeout }
    }
}

impl ChangeFeed for BusFeed {
    async fn subscribe(&self, filter: TableFilter) -> Subscription {
        // The change receiver exists before readiness is awaited, so nothing
        // committed after this point is missed.
        let changes = self.bus.receiver();
        let mut status_rx = self.bus.status_watcher();
        let ready = tokio::time::timeout(self.ready_timeout, async {
            status_rx
                .wait_for(Option::is_some)
                .await
                .map(|current| *current)
        })
        .await;
        let status = match ready {
            Ok(Ok(current)) => current.unwrap_or(SubscriptionStatus::TimedOut),
            Ok(Err(_)) => SubscriptionStatus::Closed,
            Err(_) => SubscriptionStatus::TimedOut,
        };
        status_rx.mark_unchanged();
        tracing::debug!(table = %filter.table, ?status, "feed subscription opened");
        Subscription {
            filter,
            changes,
            status_rx,
            status,
            closed: false,
        }
    }
}
