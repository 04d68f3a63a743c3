//! Event DTOs, including the JSON part of the multipart event forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Event, EventDraft, EventStatus, EventSummary};
use crate::service::EventSaved;

/// JSON carried in the `payload` part of `POST /events` and
/// `PUT /events/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EventPayload {
    /// Event fields.
    #[serde(flatten)]
    pub event: EventDraft,
    /// Number of placeholder prizes to add. On update these are appended
    /// after the event's existing prizes.
    #[serde(default)]
    pub prizes_count: u32,
}

/// Multipart body of the event forms, for documentation only.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct EventForm {
    /// [`EventPayload`] as JSON text.
    payload: String,
    /// Optional image file; replaces the current image on update.
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

/// An event row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventDto {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Display title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Start timestamp.
    pub start_date: DateTime<Utc>,
    /// End timestamp.
    pub end_date: DateTime<Utc>,
    /// Public image URL.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.into(),
            title: event.title,
            description: event.description,
            status: event.status,
            start_date: event.start_date,
            end_date: event.end_date,
            image_url: event.image_url,
            created_at: event.created_at,
        }
    }
}

/// An event with its participant and prize counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventSummaryDto {
    /// The event.
    #[serde(flatten)]
    pub event: EventDto,
    /// Exact participant count.
    pub participant_count: u64,
    /// Exact prize count.
    pub prizes_count: u64,
}

impl From<EventSummary> for EventSummaryDto {
    fn from(summary: EventSummary) -> Self {
        Self {
            event: summary.event.into(),
            participant_count: summary.participant_count,
            prizes_count: summary.prizes_count,
        }
    }
}

/// Response body for `GET /events`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events, newest first.
    pub data: Vec<EventSummaryDto>,
    /// Sum of all participant counts.
    pub total_participants: u64,
}

impl From<Vec<EventSummary>> for EventListResponse {
    fn from(summaries: Vec<EventSummary>) -> Self {
        let total_participants = summaries.iter().map(|s| s.participant_count).sum();
        Self {
            data: summaries.into_iter().map(EventSummaryDto::from).collect(),
            total_participants,
        }
    }
}

/// Response body for event create and update.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventSavedResponse {
    /// The stored event.
    pub event: EventDto,
    /// Placeholder prizes inserted by this request.
    pub prizes_added: usize,
    /// Set when the event was saved but its placeholder prizes were not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<EventSaved> for EventSavedResponse {
    fn from(saved: EventSaved) -> Self {
        Self {
            event: saved.event.into(),
            prizes_added: saved.prizes_added,
            warning: saved.warning,
        }
    }
}
