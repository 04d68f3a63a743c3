//! "Unseen new entries" badge shared by all connections of an admin.
//!
//! Opening the entries table from any connection stamps a last-viewed time
//! for that admin in the [`LastViewedRegistry`]. Every dashboard connection
//! of the same admin watches that stamp and resets its [`UnseenCounter`]
//! when a newer one arrives.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;

use crate::domain::AdminId;

/// Last time an admin opened the entries table, if ever.
pub type LastViewed = Option<DateTime<Utc>>;

/// Per-admin last-viewed stamps with change notification.
#[derive(Debug, Default)]
pub struct LastViewedRegistry {
    admins: Mutex<HashMap<AdminId, watch::Sender<LastViewed>>>,
}

impl LastViewedRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_sender<T>(&self, admin: AdminId, f: impl FnOnce(&watch::Sender<LastViewed>) -> T) -> T {
        let mut admins = self.admins.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = admins
            .entry(admin)
            .or_insert_with(|| watch::channel(None).0);
        f(sender)
    }

    /// Subscribes to `admin`'s last-viewed stamp.
    #[must_use]
    pub fn watch(&self, admin: AdminId) -> watch::Receiver<LastViewed> {
        self.with_sender(admin, watch::Sender::subscribe)
    }

    /// Returns `admin`'s current stamp.
    #[must_use]
    pub fn last_viewed(&self, admin: AdminId) -> LastViewed {
        self.with_sender(admin, |sender| *sender.borrow())
    }

    /// Stamps "now" for `admin` and wakes every watcher of that admin.
    ///
    /// Stamps strictly increase, so two visits in the same clock tick are
    /// still seen as two.
    pub fn mark_viewed(&self, admin: AdminId) -> DateTime<Utc> {
        self.with_sender(admin, |sender| {
            let now = Utc::now();
            let stamp = match *sender.borrow() {
                Some(previous) if previous >= now => previous + Duration::microseconds(1),
                _ => now,
            };
            sender.send_replace(Some(stamp));
            tracing::debug!(%admin, %stamp, "entries marked viewed");
            stamp
        })
    }
}

/// Count of entry inserts since the admin last opened the entries table.
#[derive(Debug, Clone, Default)]
pub struct UnseenCounter {
    count: u64,
    seen: LastViewed,
}

impl UnseenCounter {
    /// Starts at 0, remembering the stamp current at creation.
    #[must_use]
    pub const fn new(last_viewed: LastViewed) -> Self {
        Self {
            count: 0,
            seen: last_viewed,
        }
    }

    /// Current count.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Counts one inserted entry.
    pub const fn on_insert(&mut self) {
        self.count += 1;
    }

    /// Feeds a last-viewed stamp; returns `true` if it reset the count.
    pub fn observe_last_viewed(&mut self, stamp: LastViewed) -> bool {
        let newer = match (stamp, self.seen) {
            (Some(stamp), Some(seen)) => stamp > seen,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if newer {
            self.seen = stamp;
            self.count = 0;
        }
        newer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_count_up_until_a_newer_visit() {
        let mut counter = UnseenCounter::new(None);
        counter.on_insert();
        counter.on_insert();
        assert_eq!(counter.count(), 2);

        assert!(!counter.observe_last_viewed(None));
        assert_eq!(counter.count(), 2);

        let visit = Utc::now();
        assert!(counter.observe_last_viewed(Some(visit)));
        assert_eq!(counter.count(), 0);

        counter.on_insert();
        assert!(!counter.observe_last_viewed(Some(visit)), "same stamp again");
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn same_connection_visit_resets() {
        let registry = LastViewedRegistry::new();
        let admin = AdminId::new();
        let mut counter = UnseenCounter::new(registry.last_viewed(admin));
        counter.on_insert();

        // Visit the entries table, then come back to the dashboard.
        registry.mark_viewed(admin);
        assert!(counter.observe_last_viewed(registry.last_viewed(admin)));
        assert_eq!(counter.count(), 0);
    }

    #[tokio::test]
    async fn other_connection_visit_is_broadcast() {
        let registry = LastViewedRegistry::new();
        let admin = AdminId::new();

        let mut dashboard_rx = registry.watch(admin);
        let mut counter = UnseenCounter::new(*dashboard_rx.borrow_and_update());
        counter.on_insert();
        counter.on_insert();

        registry.mark_viewed(admin);
        assert!(dashboard_rx.changed().await.is_ok());
        let stamp = *dashboard_rx.borrow_and_update();
        assert!(counter.observe_last_viewed(stamp));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn admins_are_isolated() {
        let registry = LastViewedRegistry::new();
        let (a, b) = (AdminId::new(), AdminId::new());
        let mut counter = UnseenCounter::new(registry.last_viewed(b));
        counter.on_insert();
        registry.mark_viewed(a);
        assert!(!counter.observe_last_viewed(registry.last_viewed(b)));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn stamps_strictly_increase() {
        let registry = LastViewedRegistry::new();
        let admin = AdminId::new();
        let first = registry.mark_viewed(admin);
        let second = registry.mark_viewed(admin);
        assert!(second > first);
    }
}
