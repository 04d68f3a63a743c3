//! Giveaway events and their form validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventId;
use super::validation::{FieldErrors, required};

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Event is open for participation.
    Running,
    /// Event is announced but not yet open.
    #[default]
    Upcoming,
    /// Event has ended.
    Completed,
}

impl EventStatus {
    /// Returns the status as stored in the `events.status` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "upcoming" => Ok(Self::Upcoming),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown event status: {other}")),
        }
    }
}

/// A stored giveaway event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Row identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Start of the event.
    pub start_date: DateTime<Utc>,
    /// End of the event; never before `start_date`.
    pub end_date: DateTime<Utc>,
    /// Public URL of the event image, either uploaded or linked.
    pub image_url: Option<String>,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

/// An event together with its derived counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    /// The event row.
    #[serde(flatten)]
    pub event: Event,
    /// Exact number of participant rows for this event.
    pub participant_count: u64,
    /// Exact number of prize rows for this event.
    pub prizes_count: u64,
}

/// Unvalidated event fields as submitted by the add/edit forms.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EventDraft {
    /// Event title.
    #[serde(default)]
    pub title: String,
    /// Event description.
    #[serde(default)]
    pub description: String,
    /// Lifecycle status, `upcoming` when omitted.
    #[serde(default)]
    pub status: EventStatus,
    /// Start timestamp.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// End timestamp.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Linked image URL; ignored when a file is uploaded.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Event fields that passed validation, trimmed and ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
    /// Trimmed title.
    pub title: String,
    /// Trimmed description.
    pub description: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Start timestamp.
    pub start_date: DateTime<Utc>,
    /// End timestamp.
    pub end_date: DateTime<Utc>,
    /// Linked image URL after trimming; `None` when blank.
    pub image_url: Option<String>,
}

impl EventDraft {
    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// Returns every failing field: blank title or description, missing
    /// dates, or an end date before the start date.
    pub fn validate(&self) -> Result<EventFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required(&mut errors, "title", &self.title, "Title is required");
        let description = required(
            &mut errors,
            "description",
            &self.description,
            "Description is required",
        );
        if self.start_date.is_none() {
            errors.add("start_date", "Start date is required");
        }
        if self.end_date.is_none() {
            errors.add("end_date", "End date is required");
        }

        let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date) else {
            return Err(errors);
        };
        if start_date > end_date {
            errors.add("end_date", "End date must be after start date");
        }

        let image_url = self
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        errors.into_result(EventFields {
            title,
            description,
            status: self.status,
            start_date,
            end_date,
            image_url,
        })
    }
}
