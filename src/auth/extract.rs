//! Extractor guarding admin-only routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use super::get_session;
use crate::domain::AdminSession;
use crate::error::AdminError;

/// Extractor that requires an active admin session.
///
/// Rejects with [`AdminError::NotAuthenticated`] (401) when no admin is
/// logged in, so the client goes to the login page, and with
/// [`AdminError::AccountInactive`] (403) when the stored admin is not
/// active, so the client shows the unauthorized page.
///
/// ```rust,ignore
/// async fn handler(RequireActiveAdmin(admin): RequireActiveAdmin) -> String {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireActiveAdmin(pub AdminSession);

impl<S> FromRequestParts<S> for RequireActiveAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminError::NotAuthenticated)?;
        let admin = get_session(session)
            .await?
            .ok_or(AdminError::NotAuthenticated)?;
        if !admin.is_active() {
            tracing::debug!(admin_id = %admin.id, status = admin.status.as_str(), "inactive admin refused");
            return Err(AdminError::AccountInactive);
        }
        Ok(Self(admin))
    }
}
