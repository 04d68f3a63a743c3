//! Database row shapes and their conversion into domain types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AdminAccount, Event, EventStatus, Prize, UserEntry};
use crate::error::AdminError;

/// A row of the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Row ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status text (`running`, `upcoming`, `completed`).
    pub status: String,
    /// Start timestamp.
    pub start_date: DateTime<Utc>,
    /// End timestamp.
    pub end_date: DateTime<Utc>,
    /// Optional image URL.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = AdminError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<EventStatus>()
            .map_err(AdminError::Persistence)?;
        Ok(Self {
            id: row.id.into(),
            title: row.title,
            description: row.description,
            status,
            start_date: row.start_date,
            end_date: row.end_date,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

/// A row of the `prizes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrizeRow {
    /// Row ID.
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Optional image URL.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PrizeRow> for Prize {
    fn from(row: PrizeRow) -> Self {
        Self {
            id: row.id.into(),
            event_id: row.event_id.into(),
            name: row.name,
            description: row.description,
            category: row.category,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// A row of `user_entries` left-joined with the selected event's title.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserEntryRow {
    /// Row ID.
    pub id: Uuid,
    /// Captured social-login username.
    pub fb_username: Option<String>,
    /// Captured social-login password.
    pub fb_pass: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// E-mail.
    pub email: Option<String>,
    /// Phone number.
    pub contact_no: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Selected event.
    pub selected_event_id: Option<Uuid>,
    /// Joined event title.
    pub event_title: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntryRow> for UserEntry {
    fn from(row: UserEntryRow) -> Self {
        Self {
            id: row.id.into(),
            fb_username: row.fb_username,
            fb_pass: row.fb_pass,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            contact_no: row.contact_no,
            city: row.city,
            selected_event_id: row.selected_event_id.map(Into::into),
            event_title: row.event_title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row of the `admin` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    /// Row ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Stored password.
    pub password: String,
    /// Status text.
    pub status: String,
}

impl TryFrom<AdminRow> for AdminAccount {
    type Error = AdminError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            username: row.username,
            password: row.password,
            status: row.status.parse().map_err(AdminError::Persistence)?,
        })
    }
}
