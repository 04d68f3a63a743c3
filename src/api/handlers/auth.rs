//! Login, logout and the current-admin endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_sessions::Session;

use crate::api::dto::{AdminDto, LoginRequest};
use crate::app_state::AppState;
use crate::auth::{RequireActiveAdmin, clear_session, set_session};
use crate::error::{AdminError, ErrorResponse};
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// `POST /auth/login` — Open an admin session.
///
/// # Errors
///
/// Returns [`AdminError::InvalidCredentials`] or
/// [`AdminError::AccountInactive`].
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Checks the credentials against the admin table and stores the admin in a fresh server-side session.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AdminDto),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 403, description = "Account is not active", body = ErrorResponse),
    )
)]
pub async fn login<S: AdminStore, B: BlobStore>(
    State(state): State<AppState<S, B>>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AdminError> {
    let admin = state.auth_service.login(&req.username, &req.password).await?;
    set_session(&session, &admin).await?;
    Ok(Json(AdminDto::from(&admin)))
}

/// `POST /auth/logout` — Close the session.
///
/// # Errors
///
/// Returns [`AdminError::Session`] if the session store fails.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Log out",
    responses(
        (status = 204, description = "Session cleared"),
    )
)]
pub async fn logout(session: Session) -> Result<impl IntoResponse, AdminError> {
    clear_session(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me` — The logged-in admin.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    summary = "Current admin",
    responses(
        (status = 200, description = "Logged-in admin", body = AdminDto),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Account is not active", body = ErrorResponse),
    )
)]
pub async fn me(RequireActiveAdmin(admin): RequireActiveAdmin) -> impl IntoResponse {
    Json(AdminDto::from(&admin))
}

/// Authentication routes.
pub fn routes<S: AdminStore, B: BlobStore>() -> Router<AppState<S, B>> {
    Router::new()
        .route("/auth/login", post(login::<S, B>))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
