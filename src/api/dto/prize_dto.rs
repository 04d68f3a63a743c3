//! Prize DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Prize;

/// A prize row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeDto {
    /// Prize identifier.
    pub id: uuid::Uuid,
    /// Owning event.
    pub event_id: uuid::Uuid,
    /// Prize name.
    pub name: String,
    /// Prize description.
    pub description: String,
    /// Prize category.
    pub category: String,
    /// Linked image URL.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Prize> for PrizeDto {
    fn from(prize: Prize) -> Self {
        Self {
            id: prize.id.into(),
            event_id: prize.event_id.into(),
            name: prize.name,
            description: prize.description,
            category: prize.category,
            image_url: prize.image_url,
            created_at: prize.created_at,
        }
    }
}
