//! PostgreSQL implementation of the store layer.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{AdminRow, EventRow, PrizeRow, UserEntryRow};
use super::{AdminStore, RangedQuery};
use crate::config::AdminConfig;
use crate::domain::{
    AdminAccount, Event, EventFields, EventId, Prize, PrizeFields, PrizeId, UserEntry,
};
use crate::error::AdminError;

const EVENT_COLUMNS: &str =
    "id, title, description, status, start_date, end_date, image_url, created_at";

const PRIZE_COLUMNS: &str = "id, event_id, name, description, category, image_url, created_at";

fn db_err(e: sqlx::Error) -> AdminError {
    AdminError::Persistence(e.to_string())
}

/// Converts inclusive offset bounds into `(LIMIT, OFFSET)`.
fn limit_offset(from: u64, to: u64) -> (i64, i64) {
    let limit = to.saturating_sub(from).saturating_add(1);
    (
        i64::try_from(limit).unwrap_or(i64::MAX),
        i64::try_from(from).unwrap_or(i64::MAX),
    )
}

fn count_to_u64(count: i64) -> Option<u64> {
    u64::try_from(count).ok()
}

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool with the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] if the database is unreachable.
    pub async fn connect(config: &AdminConfig) -> Result<Self, AdminError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_err)?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled migrations (tables, cascades, change triggers).
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), AdminError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AdminError::Persistence(e.to_string()))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `user_entries` joined with event titles, newest first.
#[derive(Debug, Clone)]
pub struct PgEntriesQuery {
    pool: PgPool,
}

impl RangedQuery for PgEntriesQuery {
    type Row = UserEntry;

    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<UserEntry>, AdminError> {
        let (limit, offset) = limit_offset(from, to);
        let rows = sqlx::query_as::<_, UserEntryRow>(
            "SELECT u.id, u.fb_username, u.fb_pass, u.first_name, u.last_name, u.email, \
             u.contact_no, u.city, u.selected_event_id, e.title AS event_title, \
             u.created_at, u.updated_at \
             FROM user_entries u LEFT JOIN events e ON e.id = u.selected_event_id \
             ORDER BY u.created_at DESC, u.id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(UserEntry::from).collect())
    }

    async fn exact_count(&self) -> Result<Option<u64>, AdminError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count_to_u64(count))
    }
}

/// `events`, newest first.
#[derive(Debug, Clone)]
pub struct PgEventsQuery {
    pool: PgPool,
}

impl RangedQuery for PgEventsQuery {
    type Row = Event;

    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<Event>, AdminError> {
        let (limit, offset) = limit_offset(from, to);
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Event::try_from).collect()
    }

    async fn exact_count(&self) -> Result<Option<u64>, AdminError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count_to_u64(count))
    }
}

/// Prizes of one event, oldest first.
#[derive(Debug, Clone)]
pub struct PgPrizesQuery {
    pool: PgPool,
    event_id: Uuid,
}

impl RangedQuery for PgPrizesQuery {
    type Row = Prize;

    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<Prize>, AdminError> {
        let (limit, offset) = limit_offset(from, to);
        let rows = sqlx::query_as::<_, PrizeRow>(&format!(
            "SELECT {PRIZE_COLUMNS} FROM prizes WHERE event_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(self.event_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Prize::from).collect())
    }

    async fn exact_count(&self) -> Result<Option<u64>, AdminError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM prizes WHERE event_id = $1")
                .bind(self.event_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(count_to_u64(count))
    }
}

/// Participant ids of one event.
#[derive(Debug, Clone)]
pub struct PgParticipantsQuery {
    pool: PgPool,
    event_id: Uuid,
}

impl RangedQuery for PgParticipantsQuery {
    type Row = Uuid;

    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<Uuid>, AdminError> {
        let (limit, offset) = limit_offset(from, to);
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM participants WHERE event_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(self.event_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn exact_count(&self) -> Result<Option<u64>, AdminError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM participants WHERE event_id = $1",
        )
        .bind(self.event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(count_to_u64(count))
    }
}

impl AdminStore for PgStore {
    type Entries = PgEntriesQuery;
    type Events = PgEventsQuery;
    type Prizes = PgPrizesQuery;
    type Participants = PgParticipantsQuery;

    fn entries(&self) -> PgEntriesQuery {
        PgEntriesQuery {
            pool: self.pool.clone(),
        }
    }

    fn events(&self) -> PgEventsQuery {
        PgEventsQuery {
            pool: self.pool.clone(),
        }
    }

    fn prizes_of(&self, event_id: EventId) -> PgPrizesQuery {
        PgPrizesQuery {
            pool: self.pool.clone(),
            event_id: event_id.into(),
        }
    }

    fn participants_of(&self, event_id: EventId) -> PgParticipantsQuery {
        PgParticipantsQuery {
            pool: self.pool.clone(),
            event_id: event_id.into(),
        }
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, AdminError> {
        sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(Event::try_from)
        .transpose()
    }

    async fn insert_event(&self, fields: &EventFields) -> Result<Event, AdminError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events (title, description, status, start_date, end_date, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.status.as_str())
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.image_url.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Event::try_from(row)
    }

    async fn update_event(
        &self,
        id: EventId,
        fields: &EventFields,
    ) -> Result<Option<Event>, AdminError> {
        sqlx::query_as::<_, EventRow>(&format!(
            "UPDATE events SET title = $2, description = $3, status = $4, start_date = $5, \
             end_date = $6, image_url = $7 WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(Uuid::from(id))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.status.as_str())
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(Event::try_from)
        .transpose()
    }

    async fn delete_event(&self, id: EventId) -> Result<Option<Event>, AdminError> {
        sqlx::query_as::<_, EventRow>(&format!(
            "DELETE FROM events WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(Event::try_from)
        .transpose()
    }

    async fn insert_prizes(
        &self,
        event_id: EventId,
        prizes: &[PrizeFields],
    ) -> Result<Vec<Prize>, AdminError> {
        if prizes.is_empty() {
            return Ok(Vec::new());
        }
        let event_uuid = Uuid::from(event_id);
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "INSERT INTO prizes (event_id, name, description, category, image_url) ",
        );
        builder.push_values(prizes, |mut row, prize| {
            row.push_bind(event_uuid)
                .push_bind(prize.name.clone())
                .push_bind(prize.description.clone())
                .push_bind(prize.category.clone())
                .push_bind(prize.image_url.clone());
        });
        builder.push(format!(" RETURNING {PRIZE_COLUMNS}"));
        let rows = builder
            .build_query_as::<PrizeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Prize::from).collect())
    }

    async fn get_prize(&self, id: PrizeId) -> Result<Option<Prize>, AdminError> {
        let row = sqlx::query_as::<_, PrizeRow>(&format!(
            "SELECT {PRIZE_COLUMNS} FROM prizes WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Prize::from))
    }

    async fn update_prize(
        &self,
        id: PrizeId,
        fields: &PrizeFields,
    ) -> Result<Option<Prize>, AdminError> {
        let row = sqlx::query_as::<_, PrizeRow>(&format!(
            "UPDATE prizes SET name = $2, description = $3, category = $4, image_url = $5 \
             WHERE id = $1 RETURNING {PRIZE_COLUMNS}"
        ))
        .bind(Uuid::from(id))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.category)
        .bind(fields.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Prize::from))
    }

    async fn delete_prize(&self, id: PrizeId) -> Result<Option<Prize>, AdminError> {
        let row = sqlx::query_as::<_, PrizeRow>(&format!(
            "DELETE FROM prizes WHERE id = $1 RETURNING {PRIZE_COLUMNS}"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Prize::from))
    }

    async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>, AdminError> {
        sqlx::query_as::<_, AdminRow>(
            "SELECT id, username, password, status FROM admin WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(AdminAccount::try_from)
        .transpose()
    }
}
