//! Prizes attached to events, including placeholder batches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{FieldErrors, required};
use super::{EventId, PrizeId};

/// Category given to generated placeholder prizes.
pub const PLACEHOLDER_CATEGORY: &str = "General";

/// A stored prize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prize {
    /// Row identifier.
    pub id: PrizeId,
    /// Owning event.
    pub event_id: EventId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Free-form category label.
    pub category: String,
    /// Optional linked image URL.
    pub image_url: Option<String>,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Unvalidated prize fields from the manage-prizes form.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PrizeDraft {
    /// Prize name.
    #[serde(default)]
    pub name: String,
    /// Prize description.
    #[serde(default)]
    pub description: String,
    /// Prize category.
    #[serde(default)]
    pub category: String,
    /// Optional linked image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Prize fields ready to insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeFields {
    /// Trimmed name.
    pub name: String,
    /// Trimmed description.
    pub description: String,
    /// Trimmed category.
    pub category: String,
    /// Trimmed image URL, `None` when blank.
    pub image_url: Option<String>,
}

impl PrizeDraft {
    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// Returns the blank fields among name, description and category.
    pub fn validate(&self) -> Result<PrizeFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", &self.name, "Prize name is required");
        let description = required(
            &mut errors,
            "description",
            &self.description,
            "Description is required",
        );
        let category = required(
            &mut errors,
            "category",
            &self.category,
            "Category is required",
        );
        let image_url = self
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        errors.into_result(PrizeFields {
            name,
            description,
            category,
            image_url,
        })
    }
}

/// Builds `count` placeholder prizes numbered after `existing` prizes.
///
/// An event that already has 2 prizes gets `Prize 3`, `Prize 4`, ...
#[must_use]
pub fn placeholder_prizes(existing: u64, count: u32) -> Vec<PrizeFields> {
    (1..=u64::from(count))
        .map(|offset| {
            let n = existing.saturating_add(offset);
            PrizeFields {
                name: format!("Prize {n}"),
                description: format!("Description for Prize {n}"),
                category: PLACEHOLDER_CATEGORY.to_string(),
                image_url: None,
            }
        })
        .collect()
}
