//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::realtime::ConnectionState;
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    /// State of the database change feed.
    change_feed: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and the state of the change feed.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler<S: AdminStore, B: BlobStore>(
    State(state): State<AppState<S, B>>,
) -> impl IntoResponse {
    let change_feed = state
        .change_bus
        .status()
        .map_or(ConnectionState::Connecting, ConnectionState::from);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            change_feed: change_feed.as_str().to_string(),
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes<S: AdminStore, B: BlobStore>() -> Router<AppState<S, B>> {
    Router::new().route("/health", get(health_handler::<S, B>))
}
