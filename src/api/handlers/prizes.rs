//! Prize handlers: list and create per event, update and delete by id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::PrizeDto;
use crate::app_state::AppState;
use crate::auth::RequireActiveAdmin;
use crate::domain::{EventId, PrizeDraft, PrizeId};
use crate::error::{AdminError, ErrorResponse};
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// `GET /events/{id}/prizes` — An event's prizes, oldest first.
///
/// # Errors
///
/// Returns [`AdminError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/prizes",
    tag = "Prizes",
    summary = "List prizes of an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Prizes, oldest first", body = Vec<PrizeDto>),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_prizes<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AdminError> {
    let prizes = state.prize_service.list(EventId::from_uuid(id)).await?;
    let data: Vec<PrizeDto> = prizes.into_iter().map(PrizeDto::from).collect();
    Ok(Json(data))
}

/// `POST /events/{id}/prizes` — Add a prize to an event.
///
/// # Errors
///
/// Returns [`AdminError::Validation`] for blank fields and
/// [`AdminError::EventNotFound`] for an unknown event.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/prizes",
    tag = "Prizes",
    summary = "Create a prize",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = PrizeDraft,
    responses(
        (status = 201, description = "Prize created", body = PrizeDto),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn create_prize<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Path(id): Path<uuid::Uuid>,
    Json(draft): Json<PrizeDraft>,
) -> Result<impl IntoResponse, AdminError> {
    let prize = state
        .prize_service
        .create(EventId::from_uuid(id), &draft)
        .await?;
    Ok((StatusCode::CREATED, Json(PrizeDto::from(prize))))
}

/// `PUT /prizes/{id}` — Overwrite a prize.
///
/// # Errors
///
/// Returns [`AdminError::Validation`] or [`AdminError::PrizeNotFound`].
#[utoipa::path(
    put,
    path = "/api/v1/prizes/{id}",
    tag = "Prizes",
    summary = "Update a prize",
    params(
        ("id" = uuid::Uuid, Path, description = "Prize UUID"),
    ),
    request_body = PrizeDraft,
    responses(
        (status = 200, description = "Prize updated", body = PrizeDto),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Prize not found", body = ErrorResponse),
    )
)]
pub async fn update_prize<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Path(id): Path<uuid::Uuid>,
    Json(draft): Json<PrizeDraft>,
) -> Result<impl IntoResponse, AdminError> {
    let prize = state
        .prize_service
        .update(PrizeId::from_uuid(id), &draft)
        .await?;
    Ok(Json(PrizeDto::from(prize)))
}

/// `DELETE /prizes/{id}` — Remove a prize.
///
/// # Errors
///
/// Returns [`AdminError::PrizeNotFound`] if the prize does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/prizes/{id}",
    tag = "Prizes",
    summary = "Delete a prize",
    params(
        ("id" = uuid::Uuid, Path, description = "Prize UUID"),
    ),
    responses(
        (status = 204, description = "Prize deleted"),
        (status = 404, description = "Prize not found", body = ErrorResponse),
    )
)]
pub async fn delete_prize<S: AdminStore, B: BlobStore>(
    RequireActiveAdmin(_admin): RequireActiveAdmin,
    State(state): State<AppState<S, B>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AdminError> {
    state.prize_service.delete(PrizeId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Prize routes.
pub fn routes<S: AdminStore, B: BlobStore>() -> Router<AppState<S, B>> {
    Router::new()
        .route(
            "/events/{id}/prizes",
            get(list_prizes::<S, B>).post(create_prize::<S, B>),
        )
        .route(
            "/prizes/{id}",
            put(update_prize::<S, B>).delete(delete_prize::<S, B>),
        )
}
