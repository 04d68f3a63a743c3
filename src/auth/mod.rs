//! Session gate: server-side admin sessions and the extractor that
//! protects admin routes.
//!
//! Sessions live in PostgreSQL (`tower_sessions.session`) behind a cookie
//! and expire after a configurable period of inactivity. Expired rows are
//! purged by a background sweeper. The stored value is an
//! [`AdminSession`]; [`RequireActiveAdmin`] turns it into 401/403 decisions.

pub mod extract;

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tower_sessions::cookie::SameSite;
use tower_sessions::session_store::{ExpiredDeletion, SessionStore};
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::domain::AdminSession;
use crate::error::AdminError;

pub use extract::RequireActiveAdmin;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "giveaway_admin_session";

/// How often expired sessions are deleted.
pub const EXPIRED_SESSION_SWEEP: Duration = Duration::from_secs(60);

/// Keys used in the session store.
pub mod session_keys {
    /// The logged-in [`crate::domain::AdminSession`].
    pub const ADMIN: &str = "admin";
}

/// Session store on the service's pool.
///
/// Uses the store's default `tower_sessions.session` table, created by the
/// bundled migrations.
#[must_use]
pub fn session_store(pool: PgPool) -> PostgresStore {
    PostgresStore::new(pool)
}

/// Builds the session layer over `store` with an inactivity expiry of
/// `ttl_secs`.
#[must_use]
pub fn session_layer<Store>(store: Store, ttl_secs: i64, secure: bool) -> SessionManagerLayer<Store>
where
    Store: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(ttl_secs),
        ))
        .with_secure(secure)
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Deletes expired sessions every `period` until the task is aborted.
#[must_use]
pub fn spawn_session_sweeper<Store>(store: Store, period: Duration) -> JoinHandle<()>
where
    Store: ExpiredDeletion + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match store.delete_expired().await {
                Ok(()) => tracing::trace!("expired sessions purged"),
                Err(e) => tracing::warn!(error = %e, "expired session purge failed"),
            }
        }
    })
}

/// Reads the admin stored in `session`, if any.
///
/// # Errors
///
/// Returns [`AdminError::Session`] if the session store fails.
pub async fn get_session(session: &Session) -> Result<Option<AdminSession>, AdminError> {
    session
        .get::<AdminSession>(session_keys::ADMIN)
        .await
        .map_err(|e| AdminError::Session(e.to_string()))
}

/// Stores `admin` in a fresh session id.
///
/// # Errors
///
/// Returns [`AdminError::Session`] if the session store fails.
pub async fn set_session(session: &Session, admin: &AdminSession) -> Result<(), AdminError> {
    session
        .cycle_id()
        .await
        .map_err(|e| AdminError::Session(e.to_string()))?;
    session
        .insert(session_keys::ADMIN, admin)
        .await
        .map_err(|e| AdminError::Session(e.to_string()))
}

/// Deletes the session.
///
/// # Errors
///
/// Returns [`AdminError::Session`] if the session store fails.
pub async fn clear_session(session: &Session) -> Result<(), AdminError> {
    session
        .flush()
        .await
        .map_err(|e| AdminError::Session(e.to_string()))
}
