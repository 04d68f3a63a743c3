//! Realtime layer: change feed subscriptions and the live views built on
//! them.
//!
//! # Flow
//!
//! ```text
//! PostgreSQL NOTIFY ──► listener ──┐
//!                                  ├──► ChangeBus ──► BusFeed::subscribe ──► Subscription
//! admin services (own writes) ─────┘                                            │
//!                                                            ┌──────────────────┤
//!                                                            ▼                  ▼
//!                                                     EntriesView        EventCounts
//!                                                 (table + markers)   (+ UnseenCounter)
//! ```
//!
//! Each WebSocket connection owns its views and drives them from a single
//! task, so a view is never updated by two changes at once.

pub mod connection_state;
pub mod entries_sync;
pub mod event_counts;
pub mod feed;
pub mod listener;
pub mod markers;
pub mod table;
pub mod unseen;

pub use connection_state::{ConnectionState, ConnectionTracker};
pub use entries_sync::{EntriesSnapshot, EntriesView, SyncOutcome};
pub use event_counts::{EventCounts, EventCountsSnapshot};
pub use feed::{BusFeed, ChangeFeed, FeedItem, Subscription, TableFilter};
pub use markers::NewEntryMarkers;
pub use table::PaginatedTable;
pub use unseen::{LastViewed, LastViewedRegistry, UnseenCounter};
