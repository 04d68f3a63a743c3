//! User-entry handlers: paginated pages and the CSV export.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{EntriesPageResponse, PaginationParams};
use crate::app_state::AppState;
use crate::auth::RequireActiveAdmin;
use crate::error::{AdminError, ErrorResponse};
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// `GET /entries` — One page of entries, newest first.
///
/// # Errors
///
/// Returns [`AdminError::Persistence`] if the count or rows cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/entries",
    tag = "Entries",
    summary = "List entries",
    description = "Returns one page of user entries ordered by creation time, newest first, with pagination metadata.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Entry page", body = EntriesPageResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
pub async fn list_entries<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AdminError> {
    let params = params.clamped();
    let page = state.entry_service.page(params.page).await?;
    Ok(Json(EntriesPageResponse::from(page)))
}

/// `GET /entries/export` — Every entry as a CSV download.
///
/// # Errors
///
/// Returns [`AdminError::Persistence`] if any batch fails; no partial file
/// is sent.
#[utoipa::path(
    get,
    path = "/api/v1/entries/export",
    tag = "Entries",
    summary = "Export entries as CSV",
    description = "Reads every entry in batches and returns them as `users_export_YYYY-MM-DD.csv`.",
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv"),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
pub async fn export_entries<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
) -> Result<impl IntoResponse, AdminError> {
    let export = state
        .entry_service
        .export_csv(Utc::now().date_naive())
        .await?;
    tracing::info!(admin_id = %admin.id, rows = export.rows, "csv export served");
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.body))
}

/// Entry routes.
pub fn routes<S: AdminStore, B: BlobStore>() -> Router<AppState<S, B>> {
    Router::new()
        .route("/entries", get(list_entries::<S, B>))
        .route("/entries/export", get(export_entries::<S, B>))
}
