//! In-memory store used by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};

use super::{AdminStore, RangedQuery};
use crate::domain::{
    AdminAccount, Event, EventFields, EventId, Prize, PrizeFields, PrizeId, UserEntry,
};
use crate::error::AdminError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn slice_range<T: Clone>(rows: &[T], from: u64, to: u64) -> Vec<T> {
    let start = usize::try_from(from).unwrap_or(usize::MAX);
    let end = usize::try_from(to.saturating_add(1)).unwrap_or(usize::MAX);
    rows.iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .cloned()
        .collect()
}

/// Ranged query over a shared vector, with failure injection and call
/// counters.
#[derive(Debug, Clone)]
pub(crate) struct VecQuery<T> {
    rows: Arc<Mutex<Vec<T>>>,
    reported_count: Arc<Mutex<Option<Option<u64>>>>,
    fail_count: Arc<AtomicBool>,
    fail_range_from: Arc<Mutex<Option<u64>>>,
    range_calls: Arc<AtomicUsize>,
    count_calls: Arc<AtomicUsize>,
}

impl<T: Clone + Send + Sync> VecQuery<T> {
    pub(crate) fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            reported_count: Arc::new(Mutex::new(None)),
            fail_count: Arc::new(AtomicBool::new(false)),
            fail_range_from: Arc::new(Mutex::new(None)),
            range_calls: Arc::new(AtomicUsize::new(0)),
            count_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Overrides what `exact_count` answers (default: the true length).
    pub(crate) fn with_reported_count(self, count: Option<u64>) -> Self {
        *lock(&self.reported_count) = Some(count);
        self
    }

    pub(crate) fn fail_count(self) -> Self {
        self.fail_count.store(true, Ordering::SeqCst);
        self
    }

    /// Makes every range starting at or after `offset` fail.
    pub(crate) fn fail_range_from(self, offset: u64) -> Self {
        *lock(&self.fail_range_from) = Some(offset);
        self
    }

    pub(crate) fn set_failing_ranges(&self, failing: bool) {
        *lock(&self.fail_range_from) = failing.then_some(0);
    }

    /// Inserts a row at the front (newest-first ordering).
    pub(crate) fn push_front(&self, row: T) {
        lock(&self.rows).insert(0, row);
    }

    pub(crate) fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + Sync> RangedQuery for VecQuery<T> {
    type Row = T;

    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<T>, AdminError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        if lock(&self.fail_range_from).is_some_and(|offset| from >= offset) {
            return Err(AdminError::Persistence("injected range failure".to_string()));
        }
        Ok(slice_range(&lock(&self.rows), from, to))
    }

    async fn exact_count(&self) -> Result<Option<u64>, AdminError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(AdminError::Persistence("injected count failure".to_string()));
        }
        if let Some(reported) = *lock(&self.reported_count) {
            return Ok(reported);
        }
        Ok(Some(lock(&self.rows).len() as u64))
    }
}

#[derive(Debug, Default)]
struct Tables {
    events: Vec<Event>,
    prizes: Vec<Prize>,
    participants: Vec<(uuid::Uuid, EventId)>,
    entries: Vec<UserEntry>,
    admins: Vec<AdminAccount>,
    fail_prize_inserts: bool,
    fail_event_deletes: bool,
}

/// In-memory [`AdminStore`]; events and entries are kept newest first.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

/// A snapshot-on-read query over one of the [`MemoryStore`] tables.
#[derive(Clone)]
pub(crate) struct MemoryQuery<T> {
    tables: Arc<Mutex<Tables>>,
    select: Arc<dyn Fn(&Tables) -> Vec<T> + Send + Sync>,
}

impl<T> std::fmt::Debug for MemoryQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryQuery").finish_non_exhaustive()
    }
}

impl<T> MemoryQuery<T> {
    fn new(
        tables: &Arc<Mutex<Tables>>,
        select: impl Fn(&Tables) -> Vec<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            tables: Arc::clone(tables),
            select: Arc::new(select),
        }
    }

    fn rows(&self) -> Vec<T> {
        (self.select)(&lock(&self.tables))
    }
}

impl<T: Clone + Send + Sync + 'static> RangedQuery for MemoryQuery<T> {
    type Row = T;

    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<T>, AdminError> {
        Ok(slice_range(&self.rows(), from, to))
    }

    async fn exact_count(&self) -> Result<Option<u64>, AdminError> {
        Ok(Some(self.rows().len() as u64))
    }
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_admin(&self, account: AdminAccount) {
        lock(&self.tables).admins.push(account);
    }

    pub(crate) fn add_participant(&self, event_id: EventId) -> uuid::Uuid {
        let id = uuid::Uuid::new_v4();
        lock(&self.tables).participants.push((id, event_id));
        id
    }

    pub(crate) fn remove_participant(&self, id: uuid::Uuid) {
        lock(&self.tables).participants.retain(|(p, _)| *p != id);
    }

    pub(crate) fn add_entry(&self, entry: UserEntry) {
        lock(&self.tables).entries.insert(0, entry);
    }

    pub(crate) fn fail_prize_inserts(&self) {
        lock(&self.tables).fail_prize_inserts = true;
    }

    pub(crate) fn fail_event_deletes(&self) {
        lock(&self.tables).fail_event_deletes = true;
    }

    pub(crate) fn prize_count(&self, event_id: EventId) -> usize {
        lock(&self.tables)
            .prizes
            .iter()
            .filter(|p| p.event_id == event_id)
            .count()
    }
}

impl AdminStore for MemoryStore {
    type Entries = MemoryQuery<UserEntry>;
    type Events = MemoryQuery<Event>;
    type Prizes = MemoryQuery<Prize>;
    type Participants = MemoryQuery<uuid::Uuid>;

    fn entries(&self) -> Self::Entries {
        MemoryQuery::new(&self.tables, |t: &Tables| t.entries.clone())
    }

    fn events(&self) -> Self::Events {
        MemoryQuery::new(&self.tables, |t: &Tables| t.events.clone())
    }

    fn prizes_of(&self, event_id: EventId) -> Self::Prizes {
        MemoryQuery::new(&self.tables, move |t: &Tables| {
            t.prizes
                .iter()
                .filter(|p| p.event_id == event_id)
                .cloned()
                .collect()
        })
    }

    fn participants_of(&self, event_id: EventId) -> Self::Participants {
        MemoryQuery::new(&self.tables, move |t: &Tables| {
            t.participants
                .iter()
                .filter(|(_, e)| *e == event_id)
                .map(|(p, _)| *p)
                .collect()
        })
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, AdminError> {
        Ok(lock(&self.tables)
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn insert_event(&self, fields: &EventFields) -> Result<Event, AdminError> {
        let event = Event {
            id: EventId::new(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            status: fields.status,
            start_date: fields.start_date,
            end_date: fields.end_date,
            image_url: fields.image_url.clone(),
            created_at: Utc::now(),
        };
        lock(&self.tables).events.insert(0, event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        id: EventId,
        fields: &EventFields,
    ) -> Result<Option<Event>, AdminError> {
        let mut tables = lock(&self.tables);
        let Some(event) = tables.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        event.title = fields.title.clone();
        event.description = fields.description.clone();
        event.status = fields.status;
        event.start_date = fields.start_date;
        event.end_date = fields.end_date;
        event.image_url = fields.image_url.clone();
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: EventId) -> Result<Option<Event>, AdminError> {
        let mut tables = lock(&self.tables);
        if tables.fail_event_deletes {
            return Err(AdminError::Persistence("injected event delete failure".to_string()));
        }
        let Some(pos) = tables.events.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        let event = tables.events.remove(pos);
        tables.prizes.retain(|p| p.event_id != id);
        tables.participants.retain(|(_, e)| *e != id);
        Ok(Some(event))
    }

    async fn insert_prizes(
        &self,
        event_id: EventId,
        prizes: &[PrizeFields],
    ) -> Result<Vec<Prize>, AdminError> {
        let mut tables = lock(&self.tables);
        if tables.fail_prize_inserts {
            return Err(AdminError::Persistence("injected prize failure".to_string()));
        }
        let base = Utc::now();
        let created: Vec<Prize> = prizes
            .iter()
            .enumerate()
            .map(|(i, fields)| Prize {
                id: PrizeId::new(),
                event_id,
                name: fields.name.clone(),
                description: fields.description.clone(),
                category: fields.category.clone(),
                image_url: fields.image_url.clone(),
                created_at: base + Duration::microseconds(i64::try_from(i).unwrap_or(0)),
            })
            .collect();
        tables.prizes.extend(created.iter().cloned());
        Ok(created)
    }

    async fn get_prize(&self, id: PrizeId) -> Result<Option<Prize>, AdminError> {
        Ok(lock(&self.tables)
            .prizes
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update_prize(
        &self,
        id: PrizeId,
        fields: &PrizeFields,
    ) -> Result<Option<Prize>, AdminError> {
        let mut tables = lock(&self.tables);
        let Some(prize) = tables.prizes.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        prize.name = fields.name.clone();
        prize.description = fields.description.clone();
        prize.category = fields.category.clone();
        prize.image_url = fields.image_url.clone();
        Ok(Some(prize.clone()))
    }

    async fn delete_prize(&self, id: PrizeId) -> Result<Option<Prize>, AdminError> {
        let mut tables = lock(&self.tables);
        let Some(pos) = tables.prizes.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.prizes.remove(pos)))
    }

    async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>, AdminError> {
        Ok(lock(&self.tables)
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }
}
