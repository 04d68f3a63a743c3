//! Captured user entries (registration / login attempts).
//!
//! Entries are written by the public giveaway client; the admin side only
//! reads, pages and exports them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EntryId, EventId};

/// One row of the user-entries table, joined with the selected event title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserEntry {
    /// Row identifier.
    pub id: EntryId,
    /// Captured social-login username.
    pub fb_username: Option<String>,
    /// Captured social-login password.
    pub fb_pass: Option<String>,
    /// Contact first name.
    pub first_name: Option<String>,
    /// Contact last name.
    pub last_name: Option<String>,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Contact phone number.
    pub contact_no: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Event picked by the user, if any.
    pub selected_event_id: Option<EventId>,
    /// Title of the picked event (joined).
    pub event_title: Option<String>,
    /// Insertion timestamp; the table is ordered by this, newest first.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl UserEntry {
    /// Returns `true` when both social-login credentials were captured.
    #[must_use]
    pub fn has_social_login(&self) -> bool {
        self.fb_username.as_deref().is_some_and(|s| !s.is_empty())
            && self.fb_pass.as_deref().is_some_and(|s| !s.is_empty())
    }
}
