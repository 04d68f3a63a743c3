//! User-entry DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::UserEntry;
use crate::service::EntriesPage;

/// One registration row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserEntryDto {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Facebook username, when the user logged in through Facebook.
    pub fb_username: Option<String>,
    /// Facebook password as captured by the public client.
    pub fb_pass: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Contact number.
    pub contact_no: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Event the user signed up for.
    pub selected_event_id: Option<uuid::Uuid>,
    /// Title of the selected event.
    pub event_title: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntry> for UserEntryDto {
    fn from(entry: UserEntry) -> Self {
        Self {
            id: entry.id.into(),
            fb_username: entry.fb_username,
            fb_pass: entry.fb_pass,
            first_name: entry.first_name,
            last_name: entry.last_name,
            email: entry.email,
            contact_no: entry.contact_no,
            city: entry.city,
            selected_event_id: entry.selected_event_id.map(Into::into),
            event_title: entry.event_title,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

/// Response body for `GET /entries`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntriesPageResponse {
    /// Rows of the page, newest first.
    pub data: Vec<UserEntryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

impl From<EntriesPage> for EntriesPageResponse {
    fn from(page: EntriesPage) -> Self {
        Self {
            pagination: PaginationMeta {
                page: page.page,
                page_size: page.page_size,
                total: page.total,
                total_pages: page.total_pages,
            },
            data: page.rows.into_iter().map(UserEntryDto::from).collect(),
        }
    }
}
