//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for the entries endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u64,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Total number of rows.
    pub total: u64,
    /// Total number of pages; 0 when there are no rows.
    pub total_pages: u64,
}

const fn default_page() -> u64 {
    1
}

impl PaginationParams {
    /// Page number with 0 mapped to 1.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
        }
    }
}
