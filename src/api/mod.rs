//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` stays at the
//! root. Every resource route except login requires an active admin.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// Builds the complete API router with all REST endpoints.
pub fn build_router<S: AdminStore, B: BlobStore>() -> Router<AppState<S, B>> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());
    #[cfg(feature = "swagger-ui")]
    let router = router.merge(openapi::swagger_ui());
    router
}
