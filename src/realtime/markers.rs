//! Short-lived "new entry" markers.
//!
//! Every marked id expires a fixed TTL after it was marked. Expiry is
//! driven by one queue ordered by insertion time, so the next deadline is
//! always the queue front.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::EntryId;

/// Default marker lifetime.
pub const DEFAULT_MARKER_TTL: Duration = Duration::from_secs(3);

/// Set of recently inserted entry ids with a deterministic expiry queue.
#[derive(Debug, Clone)]
pub struct NewEntryMarkers {
    ttl: Duration,
    queue: VecDeque<(Instant, EntryId)>,
    live: HashMap<EntryId, Instant>,
}

impl Default for NewEntryMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_TTL)
    }
}

impl NewEntryMarkers {
    /// Creates an empty set whose markers live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            queue: VecDeque::new(),
            live: HashMap::new(),
        }
    }

    /// Marks `id` as new at `now`; re-marking restarts its lifetime.
    pub fn insert(&mut self, id: EntryId, now: Instant) {
        self.live.insert(id, now);
        self.queue.push_back((now, id));
    }

    /// Drops every marker whose lifetime ended at or before `now`.
    ///
    /// Returns the ids that stopped being marked.
    pub fn expire(&mut self, now: Instant) -> Vec<EntryId> {
        let mut expired = Vec::new();
        while let Some(&(marked_at, id)) = self.queue.front() {
            if marked_at + self.ttl > now {
                break;
            }
            self.queue.pop_front();
            // A re-marked id has a newer queue entry; only the latest counts.
            if self.live.get(&id) == Some(&marked_at) {
                self.live.remove(&id);
                expired.push(id);
            }
        }
        expired
    }

    /// Returns `true` if `id` is currently marked.
    #[must_use]
    pub fn contains(&self, id: &EntryId) -> bool {
        self.live.contains_key(id)
    }

    /// Marked ids, in no particular order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntryId> {
        self.live.keys().copied().collect()
    }

    /// When the oldest queued marker expires.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.front().map(|(marked_at, _)| *marked_at + self.ttl)
    }

    /// Number of marked ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if nothing is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_lives_exactly_the_ttl() {
        let start = Instant::now();
        let mut markers = NewEntryMarkers::new(Duration::from_secs(3));
        let id = EntryId::new();
        markers.insert(id, start);

        assert!(markers.expire(start + Duration::from_millis(2999)).is_empty());
        assert!(markers.contains(&id));
        assert_eq!(markers.expire(start + Duration::from_secs(3)), vec![id]);
        assert!(!markers.contains(&id));
        assert!(markers.next_deadline().is_none());
    }

    #[test]
    fn remark_extends_lifetime() {
        let start = Instant::now();
        let mut markers = NewEntryMarkers::new(Duration::from_secs(3));
        let id = EntryId::new();
        markers.insert(id, start);
        markers.insert(id, start + Duration::from_secs(2));

        assert!(markers.expire(start + Duration::from_secs(3)).is_empty());
        assert!(markers.contains(&id));
        assert_eq!(markers.expire(start + Duration::from_secs(5)), vec![id]);
    }

    #[test]
    fn deadlines_follow_insertion_order() {
        let start = Instant::now();
        let mut markers = NewEntryMarkers::new(Duration::from_secs(3));
        let (a, b) = (EntryId::new(), EntryId::new());
        markers.insert(a, start);
        markers.insert(b, start + Duration::from_secs(1));

        assert_eq!(markers.next_deadline(), Some(start + Duration::from_secs(3)));
        assert_eq!(markers.expire(start + Duration::from_secs(3)), vec![a]);
        assert_eq!(markers.next_deadline(), Some(start + Duration::from_secs(4)));
        assert_eq!(markers.len(), 1);
    }
}
