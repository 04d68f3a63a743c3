//! Per-connection live views.
//!
//! A connection watches the entries table, the dashboard, or both. Each
//! view owns its feed subscriptions. [`LiveViews::next_signal`] waits on all
//! of them at once and [`LiveViews::handle_signal`] applies whatever arrived,
//! returning the messages to push to the client.

use std::future::pending;

use tokio::sync::watch;
use tokio::time::Instant;

use super::messages::{NoticeLevel, ViewKind, WsCommand, WsEvent, WsMessage};
use crate::app_state::AppState;
use crate::domain::{AdminId, ChangeKind, WatchedTable};
use crate::error::AdminError;
use crate::realtime::connection_state::Transition;
use crate::realtime::{
    ChangeFeed, ConnectionState, ConnectionTracker, EntriesView, EventCounts, FeedItem,
    LastViewed, NewEntryMarkers, Subscription, SyncOutcome, TableFilter, UnseenCounter,
};
use crate::storage::BlobStore;
use crate::store::AdminStore;

const FEED_ERROR_NOTICE: &str = "Realtime connection error. Live updates are paused.";

/// Something one of the live views is waiting for has happened.
#[derive(Debug)]
pub enum Signal {
    /// Item from the entries-table subscription; `None` once it is gone.
    Entries(Option<FeedItem>),
    /// The earliest new-entry marker is due to expire.
    MarkersDue,
    /// Item from the dashboard's participants subscription.
    Participants(Option<FeedItem>),
    /// Item from the dashboard's entry-insert subscription.
    Inserts(Option<FeedItem>),
    /// Item from the dashboard's events subscription.
    Events(Option<FeedItem>),
    /// The admin's last-viewed stamp moved.
    LastViewed,
}

struct EntriesLive<S: AdminStore> {
    view: EntriesView<S::Entries>,
    feed: Option<Subscription>,
    tracker: ConnectionTracker,
}

struct DashboardLive<S: AdminStore> {
    counts: EventCounts<S>,
    participants: Option<Subscription>,
    inserts: Option<Subscription>,
    events: Option<Subscription>,
    unseen: UnseenCounter,
    last_viewed: watch::Receiver<LastViewed>,
    tracker: ConnectionTracker,
}

/// The live views of one WebSocket connection.
///
/// Owned and driven by the connection task alone.
pub struct LiveViews<S: AdminStore, B> {
    state: AppState<S, B>,
    admin: AdminId,
    entries: Option<EntriesLive<S>>,
    dashboard: Option<DashboardLive<S>>,
}

impl<S: AdminStore, B> std::fmt::Debug for LiveViews<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveViews")
            .field("admin", &self.admin)
            .field("entries", &self.entries.is_some())
            .field("dashboard", &self.dashboard.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: AdminStore, B: BlobStore> LiveViews<S, B> {
    /// No views open yet.
    #[must_use]
    pub const fn new(state: AppState<S, B>, admin: AdminId) -> Self {
        Self {
            state,
            admin,
            entries: None,
            dashboard: None,
        }
    }

    /// `true` while the entries table is open.
    #[must_use]
    pub const fn watching_entries(&self) -> bool {
        self.entries.is_some()
    }

    /// `true` while the dashboard is open.
    #[must_use]
    pub const fn watching_dashboard(&self) -> bool {
        self.dashboard.is_some()
    }

    /// Waits for the next signal of any open view.
    ///
    /// Never resolves while no view is open. Cancel safe.
    pub async fn next_signal(&mut self) -> Signal {
        let deadline = self
            .entries
            .as_ref()
            .and_then(|live| live.view.next_marker_deadline());
        let entries_feed = self.entries.as_mut().and_then(|live| live.feed.as_mut());
        let (participants, inserts, events, last_viewed) = match self.dashboard.as_mut() {
            Some(live) => (
                live.participants.as_mut(),
                live.inserts.as_mut(),
                live.events.as_mut(),
                Some(&mut live.last_viewed),
            ),
            None => (None, None, None, None),
        };
        tokio::select! {
            item = next_item(entries_feed) => Signal::Entries(item),
            () = sleep_until(deadline) => Signal::MarkersDue,
            item = next_item(participants) => Signal::Participants(item),
            item = next_item(inserts) => Signal::Inserts(item),
            item = next_item(events) => Signal::Events(item),
            () = stamp_changed(last_viewed) => Signal::LastViewed,
        }
    }

    /// Applies a signal and returns the messages for the client.
    pub async fn handle_signal(&mut self, signal: Signal) -> Vec<WsMessage> {
        match signal {
            Signal::Entries(item) => self.on_entries_item(item).await,
            Signal::MarkersDue => self.on_markers_due(),
            Signal::Participants(item) => self.on_participants_item(item).await,
            Signal::Inserts(item) => self.on_insert_item(item),
            Signal::Events(item) => self.on_events_item(item).await,
            Signal::LastViewed => self.on_last_viewed(),
        }
    }

    /// Runs a client command with envelope id `id`.
    pub async fn handle_command(&mut self, id: &str, command: WsCommand) -> Vec<WsMessage> {
        match command {
            WsCommand::WatchEntries { page } => self.watch_entries(id, page).await,
            WsCommand::GotoPage { page } => self.goto_page(id, page).await,
            WsCommand::NextPage => self.step_page(id, true).await,
            WsCommand::PrevPage => self.step_page(id, false).await,
            WsCommand::WatchDashboard => self.watch_dashboard(id).await,
            WsCommand::Unwatch => {
                self.stop_entries();
                self.stop_dashboard();
                vec![WsMessage::response(id, serde_json::json!({ "watching": [] }))]
            }
        }
    }

    // ── Commands ───────────────────────────────────────────────────────

    async fn watch_entries(&mut self, id: &str, page: u64) -> Vec<WsMessage> {
        self.stop_entries();
        let feed = self
            .state
            .feed
            .subscribe(TableFilter::table(WatchedTable::UserEntries))
            .await;
        let mut tracker = ConnectionTracker::new();
        let transition = tracker.apply(feed.status());

        let markers = NewEntryMarkers::new(self.state.config.new_entry_ttl());
        let mut view = EntriesView::new(self.state.entry_service.table(), markers);
        if let Err(e) = view.table_mut().load_page(page.max(1)).await {
            return vec![WsMessage::from_error(id, &e)];
        }
        let viewed_at = self.state.last_viewed.mark_viewed(self.admin);
        tracing::debug!(admin_id = %self.admin, page, "entries view opened");

        let mut out = vec![WsMessage::response(
            id,
            serde_json::json!({ "watching": "entries", "viewed_at": viewed_at }),
        )];
        push_state(&mut out, ViewKind::Entries, tracker.state(), transition, true);
        out.push(WsMessage::event(&WsEvent::EntriesSnapshot(view.snapshot())));
        self.entries = Some(EntriesLive {
            view,
            feed: Some(feed),
            tracker,
        });
        out
    }

    async fn goto_page(&mut self, id: &str, page: u64) -> Vec<WsMessage> {
        let Some(live) = self.entries.as_mut() else {
            return vec![not_watching(id)];
        };
        if let Err(e) = live.view.table_mut().load_page(page.max(1)).await {
            return vec![WsMessage::from_error(id, &e)];
        }
        vec![
            WsMessage::response(id, serde_json::json!({ "page": live.view.table().page() })),
            WsMessage::event(&WsEvent::EntriesSnapshot(live.view.snapshot())),
        ]
    }

    async fn step_page(&mut self, id: &str, forward: bool) -> Vec<WsMessage> {
        let Some(live) = self.entries.as_mut() else {
            return vec![not_watching(id)];
        };
        let table = live.view.table_mut();
        let moved = if forward {
            table.next().await
        } else {
            table.prev().await
        };
        match moved {
            Ok(true) => vec![
                WsMessage::response(
                    id,
                    serde_json::json!({ "moved": true, "page": live.view.table().page() }),
                ),
                WsMessage::event(&WsEvent::EntriesSnapshot(live.view.snapshot())),
            ],
            Ok(false) => vec![WsMessage::response(
                id,
                serde_json::json!({ "moved": false, "page": live.view.table().page() }),
            )],
            Err(e) => vec![WsMessage::from_error(id, &e)],
        }
    }

    async fn watch_dashboard(&mut self, id: &str) -> Vec<WsMessage> {
        self.stop_dashboard();
        let participants = self
            .state
            .feed
            .subscribe(TableFilter::table(WatchedTable::Participants))
            .await;
        let mut tracker = ConnectionTracker::new();
        let transition = tracker.apply(participants.status());

        let mut counts = EventCounts::new(self.state.store.clone(), self.state.config.fetch_batch_size);
        if let Err(e) = counts.load_all().await {
            return vec![WsMessage::from_error(id, &e)];
        }

        // Entry inserts are only subscribed once the participants feed has
        // answered.
        let inserts = self
            .state
            .feed
            .subscribe(TableFilter::table(WatchedTable::UserEntries).kind(ChangeKind::Insert))
            .await;
        let events = self
            .state
            .feed
            .subscribe(TableFilter::table(WatchedTable::Events))
            .await;
        let mut last_viewed = self.state.last_viewed.watch(self.admin);
        let unseen = UnseenCounter::new(*last_viewed.borrow_and_update());
        tracing::debug!(admin_id = %self.admin, "dashboard opened");

        let mut out = vec![WsMessage::response(
            id,
            serde_json::json!({ "watching": "dashboard" }),
        )];
        push_state(&mut out, ViewKind::Dashboard, tracker.state(), transition, true);
        out.push(WsMessage::event(&WsEvent::EventCounts(counts.snapshot())));
        out.push(WsMessage::event(&WsEvent::UnseenCount {
            count: unseen.count(),
        }));
        self.dashboard = Some(DashboardLive {
            counts,
            participants: Some(participants),
            inserts: Some(inserts),
            events: Some(events),
            unseen,
            last_viewed,
            tracker,
        });
        out
    }

    fn stop_entries(&mut self) {
        if let Some(feed) = self.entries.take().and_then(|live| live.feed) {
            feed.unsubscribe();
        }
    }

    fn stop_dashboard(&mut self) {
        if let Some(live) = self.dashboard.take() {
            for feed in [live.participants, live.inserts, live.events]
                .into_iter()
                .flatten()
            {
                feed.unsubscribe();
            }
        }
    }

    // ── Signals ────────────────────────────────────────────────────────

    async fn on_entries_item(&mut self, item: Option<FeedItem>) -> Vec<WsMessage> {
        let Some(live) = self.entries.as_mut() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let resync = match item {
            None => {
                live.feed = None;
                false
            }
            Some(FeedItem::Change(change)) => {
                match live.view.apply_change(&change, Instant::now()).await {
                    Ok(SyncOutcome::Ignored) => {}
                    Ok(_) => out.push(WsMessage::event(&WsEvent::EntriesSnapshot(
                        live.view.snapshot(),
                    ))),
                    Err(e) => out.push(live_error(&e)),
                }
                false
            }
            Some(FeedItem::Status(status)) => {
                let transition = live.tracker.apply(status);
                push_state(&mut out, ViewKind::Entries, live.tracker.state(), transition, false);
                transition.resumed
            }
            Some(FeedItem::Lagged(missed)) => {
                tracing::warn!(missed, "entries view lagged behind the change bus");
                true
            }
        };
        if resync {
            match live.view.resync().await {
                Ok(()) => out.push(WsMessage::event(&WsEvent::EntriesSnapshot(
                    live.view.snapshot(),
                ))),
                Err(e) => out.push(live_error(&e)),
            }
        }
        out
    }

    fn on_markers_due(&mut self) -> Vec<WsMessage> {
        let Some(live) = self.entries.as_mut() else {
            return Vec::new();
        };
        if live.view.expire_markers(Instant::now()) {
            vec![WsMessage::event(&WsEvent::EntriesSnapshot(live.view.snapshot()))]
        } else {
            Vec::new()
        }
    }

    async fn on_participants_item(&mut self, item: Option<FeedItem>) -> Vec<WsMessage> {
        let Some(live) = self.dashboard.as_mut() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let reload = match item {
            None => {
                live.participants = None;
                false
            }
            Some(FeedItem::Change(change)) => {
                match live.counts.apply_change(&change).await {
                    Ok(true) => out.push(WsMessage::event(&WsEvent::EventCounts(
                        live.counts.snapshot(),
                    ))),
                    Ok(false) => {}
                    Err(e) => out.push(live_error(&e)),
                }
                false
            }
            Some(FeedItem::Status(status)) => {
                let transition = live.tracker.apply(status);
                push_state(&mut out, ViewKind::Dashboard, live.tracker.state(), transition, false);
                transition.resumed
            }
            Some(FeedItem::Lagged(missed)) => {
                tracing::warn!(missed, "dashboard lagged behind the change bus");
                true
            }
        };
        if reload {
            match live.counts.load_all().await {
                Ok(()) => out.push(WsMessage::event(&WsEvent::EventCounts(
                    live.counts.snapshot(),
                ))),
                Err(e) => out.push(live_error(&e)),
            }
        }
        out
    }

    async fn on_events_item(&mut self, item: Option<FeedItem>) -> Vec<WsMessage> {
        let Some(live) = self.dashboard.as_mut() else {
            return Vec::new();
        };
        let moved = match item {
            Some(FeedItem::Change(change)) => live.counts.apply_change(&change).await,
            Some(FeedItem::Lagged(missed)) => {
                tracing::warn!(missed, "dashboard missed event changes");
                live.counts.load_all().await.map(|()| true)
            }
            // Feed health is reported through the participants subscription.
            Some(FeedItem::Status(_)) => Ok(false),
            None => {
                live.events = None;
                Ok(false)
            }
        };
        match moved {
            Ok(true) => vec![WsMessage::event(&WsEvent::EventCounts(live.counts.snapshot()))],
            Ok(false) => Vec::new(),
            Err(e) => vec![live_error(&e)],
        }
    }

    fn on_insert_item(&mut self, item: Option<FeedItem>) -> Vec<WsMessage> {
        let Some(live) = self.dashboard.as_mut() else {
            return Vec::new();
        };
        match item {
            Some(FeedItem::Change(_)) => {
                live.unseen.on_insert();
                vec![WsMessage::event(&WsEvent::UnseenCount {
                    count: live.unseen.count(),
                })]
            }
            // Feed health is reported through the participants subscription.
            Some(FeedItem::Status(_)) => Vec::new(),
            Some(FeedItem::Lagged(missed)) => {
                tracing::debug!(missed, "unseen counter missed inserts");
                Vec::new()
            }
            None => {
                live.inserts = None;
                Vec::new()
            }
        }
    }

    fn on_last_viewed(&mut self) -> Vec<WsMessage> {
        let Some(live) = self.dashboard.as_mut() else {
            return Vec::new();
        };
        let stamp = *live.last_viewed.borrow_and_update();
        if live.unseen.observe_last_viewed(stamp) {
            vec![WsMessage::event(&WsEvent::UnseenCount {
                count: live.unseen.count(),
            })]
        } else {
            Vec::new()
        }
    }
}

async fn next_item(subscription: Option<&mut Subscription>) -> Option<FeedItem> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn stamp_changed(receiver: Option<&mut watch::Receiver<LastViewed>>) {
    let Some(receiver) = receiver else {
        return pending().await;
    };
    if receiver.changed().await.is_err() {
        pending::<()>().await;
    }
}

/// Pushes the view's connection state, plus a one-time notice on its first
/// error. `always` sends the state even when it did not change.
fn push_state(
    out: &mut Vec<WsMessage>,
    view: ViewKind,
    state: ConnectionState,
    transition: Transition,
    always: bool,
) {
    if always || transition.changed {
        out.push(WsMessage::event(&WsEvent::ConnectionState { view, state }));
    }
    if transition.first_error {
        out.push(WsMessage::event(&WsEvent::Notice {
            level: NoticeLevel::Error,
            message: FEED_ERROR_NOTICE.to_string(),
        }));
    }
}

fn live_error(error: &AdminError) -> WsMessage {
    tracing::warn!(error = %error, "live view refresh failed");
    WsMessage::from_error(String::new(), error)
}

fn not_watching(id: &str) -> WsMessage {
    WsMessage::from_error(
        id,
        &AdminError::InvalidRequest("entries table is not open".to_string()),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;
    use tokio_test::{assert_pending, task};

    use super::*;
    use crate::config::AdminConfig;
    use crate::domain::{
        ChangeBus, ChangeEvent, EventDraft, EventFields, EventId, EventStatus,
        SubscriptionStatus,
    };
    use crate::realtime::entries_sync::tests::entry;
    use crate::storage::recording::RecordingBlobStore;
    use crate::store::memory::MemoryStore;
    use crate::ws::messages::WsMessageType;

    type TestViews = LiveViews<MemoryStore, RecordingBlobStore>;

    fn state(store: &MemoryStore, bus: &ChangeBus) -> AppState<MemoryStore, RecordingBlobStore> {
        bus.set_status(SubscriptionStatus::Subscribed);
        AppState::new(
            store.clone(),
            RecordingBlobStore::new(),
            bus.clone(),
            AdminConfig::default(),
        )
    }

    fn event_names(messages: &[WsMessage]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|m| m.payload.get("event").and_then(|e| e.as_str()))
            .map(str::to_string)
            .collect()
    }

    fn event_data<'a>(messages: &'a [WsMessage], name: &str) -> &'a serde_json::Value {
        let Some(data) = messages
            .iter()
            .filter(|m| m.payload.get("event") == Some(&json!(name)))
            .find_map(|m| m.payload.get("data"))
        else {
            panic!("no {name} event in {messages:?}");
        };
        data
    }

    async fn next(views: &mut TestViews) -> Vec<WsMessage> {
        let signal = views.next_signal().await;
        views.handle_signal(signal).await
    }

    async fn add_event(store: &MemoryStore, title: &str) -> EventId {
        let fields = EventFields {
            title: title.to_string(),
            description: "d".to_string(),
            status: EventStatus::Running,
            start_date: chrono::Utc::now(),
            end_date: chrono::Utc::now(),
            image_url: None,
        };
        let Ok(event) = store.insert_event(&fields).await else {
            panic!("event insert failed");
        };
        event.id
    }

    #[tokio::test]
    async fn no_views_means_no_signals() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let mut views = LiveViews::new(state(&store, &bus), AdminId::new());
        let mut signal = task::spawn(views.next_signal());
        assert_pending!(signal.poll());
    }

    #[tokio::test]
    async fn watch_entries_sends_state_and_snapshot() {
        let store = MemoryStore::new();
        for n in 0..150 {
            store.add_entry(entry(n));
        }
        let bus = ChangeBus::new(16);
        let app = state(&store, &bus);
        let admin = AdminId::new();
        let mut views = LiveViews::new(app.clone(), admin);

        let out = views
            .handle_command("c1", WsCommand::WatchEntries { page: 1 })
            .await;
        assert_eq!(out.first().map(|m| m.id.as_str()), Some("c1"));
        assert_eq!(event_names(&out), ["connection_state", "entries_snapshot"]);
        assert_eq!(
            event_data(&out, "connection_state"),
            &json!({"view": "entries", "state": "connected"})
        );
        let snapshot = event_data(&out, "entries_snapshot");
        assert_eq!(snapshot.get("total"), Some(&json!(150)));
        assert_eq!(snapshot.get("total_pages"), Some(&json!(2)));
        assert!(app.last_viewed.last_viewed(admin).is_some());

        let out = views.handle_command("c2", WsCommand::NextPage).await;
        assert_eq!(event_data(&out, "entries_snapshot").get("page"), Some(&json!(2)));
        let out = views.handle_command("c3", WsCommand::NextPage).await;
        assert_eq!(out.first().map(|m| m.payload.clone()), Some(json!({"moved": false, "page": 2})));
    }

    #[tokio::test]
    async fn paging_without_a_table_is_an_error() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let mut views = LiveViews::new(state(&store, &bus), AdminId::new());
        let out = views.handle_command("c1", WsCommand::GotoPage { page: 2 }).await;
        assert!(out.first().is_some_and(|m| m.msg_type == WsMessageType::Error));
    }

    #[tokio::test(start_paused = true)]
    async fn insert_marks_the_row_until_the_marker_expires() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let mut views = LiveViews::new(state(&store, &bus), AdminId::new());
        views
            .handle_command("c1", WsCommand::WatchEntries { page: 1 })
            .await;

        let fresh = entry(1);
        let id = fresh.id;
        store.add_entry(fresh);
        bus.publish(ChangeEvent::insert(
            WatchedTable::UserEntries,
            json!({ "id": id.to_string() }),
        ));

        let out = next(&mut views).await;
        let snapshot = event_data(&out, "entries_snapshot");
        assert_eq!(snapshot.get("new_entry_ids"), Some(&json!([id.to_string()])));
        assert_eq!(snapshot.get("total"), Some(&json!(1)));

        let started = Instant::now();
        let out = next(&mut views).await;
        assert!(started.elapsed() >= std::time::Duration::from_secs(3));
        let snapshot = event_data(&out, "entries_snapshot");
        assert_eq!(snapshot.get("new_entry_ids"), Some(&json!([])));
    }

    #[tokio::test]
    async fn feed_error_is_reported_once() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let mut views = LiveViews::new(state(&store, &bus), AdminId::new());
        views
            .handle_command("c1", WsCommand::WatchEntries { page: 1 })
            .await;

        bus.set_status(SubscriptionStatus::ChannelError);
        let out = next(&mut views).await;
        assert_eq!(event_names(&out), ["connection_state", "notice"]);

        bus.set_status(SubscriptionStatus::Subscribed);
        let out = next(&mut views).await;
        // Back online: state change plus a fresh snapshot.
        assert_eq!(event_names(&out), ["connection_state", "entries_snapshot"]);

        bus.set_status(SubscriptionStatus::ChannelError);
        let out = next(&mut views).await;
        assert_eq!(event_names(&out), ["connection_state"]);
    }

    #[tokio::test]
    async fn dashboard_tracks_participants() {
        let store = MemoryStore::new();
        let spring = add_event(&store, "Spring").await;
        let summer = add_event(&store, "Summer").await;
        store.add_participant(spring);
        let bus = ChangeBus::new(16);
        let mut views = LiveViews::new(state(&store, &bus), AdminId::new());

        let out = views.handle_command("c1", WsCommand::WatchDashboard).await;
        assert_eq!(
            event_names(&out),
            ["connection_state", "event_counts", "unseen_count"]
        );
        assert_eq!(
            event_data(&out, "event_counts").get("total_participants"),
            Some(&json!(1))
        );

        let joined = store.add_participant(summer);
        bus.publish(ChangeEvent::insert(
            WatchedTable::Participants,
            json!({ "id": joined.to_string(), "event_id": summer.to_string() }),
        ));
        let out = next(&mut views).await;
        assert_eq!(
            event_data(&out, "event_counts").get("total_participants"),
            Some(&json!(2))
        );
    }

    #[tokio::test]
    async fn unseen_badge_resets_when_another_connection_opens_the_table() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let app = state(&store, &bus);
        let admin = AdminId::new();
        let mut dashboard = LiveViews::new(app.clone(), admin);
        let mut table = LiveViews::new(app, admin);
        dashboard
            .handle_command("c1", WsCommand::WatchDashboard)
            .await;

        for n in 0..2 {
            let fresh = entry(n);
            let id = fresh.id;
            store.add_entry(fresh);
            bus.publish(ChangeEvent::insert(
                WatchedTable::UserEntries,
                json!({ "id": id.to_string() }),
            ));
        }
        let _ = next(&mut dashboard).await;
        let out = next(&mut dashboard).await;
        assert_eq!(event_data(&out, "unseen_count"), &json!({"count": 2}));

        table
            .handle_command("c2", WsCommand::WatchEntries { page: 1 })
            .await;
        let out = next(&mut dashboard).await;
        assert_eq!(event_data(&out, "unseen_count"), &json!({"count": 0}));
    }

    #[tokio::test]
    async fn unwatch_drops_every_view() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let mut views = LiveViews::new(state(&store, &bus), AdminId::new());
        views
            .handle_command("c1", WsCommand::WatchEntries { page: 1 })
            .await;
        views.handle_command("c2", WsCommand::WatchDashboard).await;
        assert!(views.watching_entries() && views.watching_dashboard());
        let receivers = bus.receiver_count();

        views.handle_command("c3", WsCommand::Unwatch).await;
        assert!(!views.watching_entries() && !views.watching_dashboard());
        assert_eq!(bus.receiver_count(), receivers - 4);
    }

    #[tokio::test]
    async fn dashboard_drops_deleted_events() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let app = state(&store, &bus);
        let keep = add_event(&store, "Keep").await;
        let doomed = add_event(&store, "Doomed").await;
        store.add_participant(keep);
        store.add_participant(doomed);
        let mut views = LiveViews::new(app.clone(), AdminId::new());
        views.handle_command("c1", WsCommand::WatchDashboard).await;

        assert!(app.event_service.delete(doomed).await.is_ok());
        let out = next(&mut views).await;
        let counts = event_data(&out, "event_counts");
        assert_eq!(counts.get("total_participants"), Some(&json!(1)));
        let titles: Vec<&str> = counts
            .get("events")
            .and_then(|e| e.as_array())
            .map(|events| events.iter().filter_map(|e| e.get("title")?.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(titles, ["Keep"]);
    }

    #[tokio::test]
    async fn dashboard_picks_up_new_events() {
        let store = MemoryStore::new();
        let bus = ChangeBus::new(16);
        let app = state(&store, &bus);
        let mut views = LiveViews::new(app.clone(), AdminId::new());
        views.handle_command("c1", WsCommand::WatchDashboard).await;

        let draft = EventDraft {
            title: "Autumn".to_string(),
            description: "d".to_string(),
            status: EventStatus::Upcoming,
            start_date: Some(chrono::Utc::now()),
            end_date: Some(chrono::Utc::now() + chrono::Duration::days(1)),
            image_url: None,
        };
        assert!(app.event_service.create(&draft, 0, None).await.is_ok());
        let out = next(&mut views).await;
        let events = event_data(&out, "event_counts").get("events").cloned();
        assert_eq!(
            events.and_then(|e| e.as_array().map(Vec::len)),
            Some(1)
        );
    }
}
