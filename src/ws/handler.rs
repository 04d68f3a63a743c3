//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::auth::RequireActiveAdmin;
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// Only an active admin may connect; the session is checked once, at
/// upgrade time.
pub async fn ws_handler<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(admin): RequireActiveAdmin,
    ws: WebSocketUpgrade,
    State(state): State<AppState<S, B>>,
) -> impl IntoResponse {
    tracing::debug!(admin_id = %admin.id, "ws upgrade");
    ws.on_upgrade(move |socket| run_connection(socket, state, admin))
}
