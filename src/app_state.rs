//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::domain::ChangeBus;
use crate::realtime::{BusFeed, LastViewedRegistry};
use crate::service::{AuthService, EntryService, EventService, PrizeService};
use crate::storage::{BlobStore, LocalBlobStore};
use crate::store::{AdminStore, PgStore};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// Generic over the data store and blob store so the whole HTTP surface can
/// run against in-memory backends; production uses the defaults.
#[derive(Debug)]
pub struct AppState<S = PgStore, B = LocalBlobStore> {
    /// Data store, used directly by the live views.
    pub store: S,
    /// Event CRUD.
    pub event_service: Arc<EventService<S, B>>,
    /// Prize CRUD.
    pub prize_service: Arc<PrizeService<S>>,
    /// Entry pages and CSV export.
    pub entry_service: Arc<EntryService<S>>,
    /// Admin login.
    pub auth_service: Arc<AuthService<S>>,
    /// Row change bus.
    pub change_bus: ChangeBus,
    /// Filtered subscriptions over the bus.
    pub feed: BusFeed,
    /// Per-admin "entries last viewed" stamps.
    pub last_viewed: Arc<LastViewedRegistry>,
    /// Service configuration.
    pub config: Arc<AdminConfig>,
}

impl<S: Clone, B> Clone for AppState<S, B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            event_service: Arc::clone(&self.event_service),
            prize_service: Arc::clone(&self.prize_service),
            entry_service: Arc::clone(&self.entry_service),
            auth_service: Arc::clone(&self.auth_service),
            change_bus: self.change_bus.clone(),
            feed: self.feed.clone(),
            last_viewed: Arc::clone(&self.last_viewed),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: AdminStore, B: BlobStore> AppState<S, B> {
    /// Wires the services around one store, one blob store and one bus.
    #[must_use]
    pub fn new(store: S, blobs: B, change_bus: ChangeBus, config: AdminConfig) -> Self {
        let batch = config.fetch_batch_size;
        let event_service = EventService::new(
            store.clone(),
            blobs,
            change_bus.clone(),
            batch,
            config.max_image_bytes,
        );
        let feed = BusFeed::new(change_bus.clone(), config.feed_ready_timeout());
        Self {
            event_service: Arc::new(event_service),
            prize_service: Arc::new(PrizeService::new(store.clone(), change_bus.clone(), batch)),
            entry_service: Arc::new(EntryService::new(store.clone(), config.page_size, batch)),
            auth_service: Arc::new(AuthService::new(store.clone())),
            store,
            change_bus,
            feed,
            last_viewed: Arc::new(LastViewedRegistry::new()),
            config: Arc::new(config),
        }
    }
}
