//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod entries;
pub mod events;
pub mod prizes;
pub mod system;

use axum::Router;

use crate::app_state::AppState;
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// Composes all resource routes under `/api/v1`.
pub fn routes<S: AdminStore, B: BlobStore>() -> Router<AppState<S, B>> {
    Router::new()
        .merge(auth::routes())
        .merge(events::routes())
        .merge(prizes::routes())
        .merge(entries::routes())
}
