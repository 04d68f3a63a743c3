//! Event handlers: list, create, get, update, delete.
//!
//! Create and update take `multipart/form-data`: a `payload` part holding
//! [`EventPayload`] as JSON and an optional `image` file part.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    EventDto, EventForm, EventListResponse, EventPayload, EventSavedResponse, EventSummaryDto,
};
use crate::app_state::AppState;
use crate::auth::RequireActiveAdmin;
use crate::domain::EventId;
use crate::error::{AdminError, ErrorResponse};
use crate::storage::{BlobStore, ImageUpload};
use crate::store::AdminStore;

/// `GET /events` — Every event with its participant and prize counts.
///
/// # Errors
///
/// Returns [`AdminError::Persistence`] if any read fails.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns every event, newest first, with exact participant and prize counts and the participant total.",
    responses(
        (status = 200, description = "Event list", body = EventListResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
pub async fn list_events<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
) -> Result<impl IntoResponse, AdminError> {
    let summaries = state.event_service.list().await?;
    Ok(Json(EventListResponse::from(summaries)))
}

/// `POST /events` — Create an event.
///
/// # Errors
///
/// Returns [`AdminError::InvalidRequest`] for a malformed form,
/// [`AdminError::Validation`] for bad fields, an image error for a rejected
/// upload and [`AdminError::Storage`] if the upload fails.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Stores the event, uploads the optional image and adds `prizes_count` placeholder prizes. A placeholder failure is reported in `warning`; the event stays saved.",
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event created", body = EventSavedResponse),
        (status = 400, description = "Invalid form or fields", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 502, description = "Image upload failed", body = ErrorResponse),
    )
)]
pub async fn create_event<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AdminError> {
    let (payload, image) = read_event_form(multipart).await?;
    let saved = state
        .event_service
        .create(&payload.event, payload.prizes_count, image)
        .await?;
    Ok((StatusCode::CREATED, Json(EventSavedResponse::from(saved))))
}

/// `GET /events/{id}` — One event with its counts.
///
/// # Errors
///
/// Returns [`AdminError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventSummaryDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AdminError> {
    let summary = state.event_service.get(EventId::from_uuid(id)).await?;
    Ok(Json(EventSummaryDto::from(summary)))
}

/// `PUT /events/{id}` — Update an event.
///
/// # Errors
///
/// Same as [`create_event`], plus [`AdminError::EventNotFound`].
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Update an event",
    description = "Overwrites the event fields. An uploaded image replaces the current one and the superseded stored image is deleted. `prizes_count` placeholders are appended after the existing prizes.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Event updated", body = EventSavedResponse),
        (status = 400, description = "Invalid form or fields", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 502, description = "Image upload failed", body = ErrorResponse),
    )
)]
pub async fn update_event<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Path(id): Path<uuid::Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AdminError> {
    let (payload, image) = read_event_form(multipart).await?;
    let saved = state
        .event_service
        .update(
            EventId::from_uuid(id),
            &payload.event,
            payload.prizes_count,
            image,
        )
        .await?;
    Ok(Json(EventSavedResponse::from(saved)))
}

/// `DELETE /events/{id}` — Delete an event, its prizes and its image.
///
/// # Errors
///
/// Returns [`AdminError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Deleted event", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AdminError> {
    let deleted = state.event_service.delete(EventId::from_uuid(id)).await?;
    Ok(Json(EventDto::from(deleted)))
}

/// Event routes.
pub fn routes<S: AdminStore, B: BlobStore>() -> Router<AppState<S, B>> {
    Router::new()
        .route(
            "/events",
            get(list_events::<S, B>).post(create_event::<S, B>),
        )
        .route(
            "/events/{id}",
            get(get_event::<S, B>)
                .put(update_event::<S, B>)
                .delete(delete_event::<S, B>),
        )
}

// ── Form Parsing ────────────────────────────────────────────────────────

fn form_error(e: &axum::extract::multipart::MultipartError) -> AdminError {
    AdminError::InvalidRequest(format!("malformed form: {}", e.body_text()))
}

/// Splits an event form into its JSON payload and optional image.
///
/// An `image` part without content is treated as "no file chosen".
async fn read_event_form(
    mut multipart: Multipart,
) -> Result<(EventPayload, Option<ImageUpload>), AdminError> {
    let mut payload = None;
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| form_error(&e))? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("payload") => {
                let text = field.text().await.map_err(|e| form_error(&e))?;
                let parsed: EventPayload = serde_json::from_str(&text)
                    .map_err(|e| AdminError::InvalidRequest(format!("invalid payload: {e}")))?;
                payload = Some(parsed);
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| form_error(&e))?;
                if !bytes.is_empty() || !file_name.is_empty() {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => {
                tracing::debug!(field = ?other, "ignoring unknown form field");
            }
        }
    }
    let payload =
        payload.ok_or_else(|| AdminError::InvalidRequest("missing payload part".to_string()))?;
    Ok((payload, image))
}
