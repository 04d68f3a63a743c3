//! Admin login.

use crate::domain::{AdminSession, AdminStatus};
use crate::error::AdminError;
use crate::store::AdminStore;

/// Checks admin credentials against the `admin` table.
#[derive(Debug, Clone)]
pub struct AuthService<S> {
    store: S,
}

impl<S: AdminStore> AuthService<S> {
    /// Creates a new `AuthService`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Verifies `username` and `password`.
    ///
    /// The stored password is compared as stored, matching how accounts
    /// are provisioned.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidCredentials`] for an unknown user or a
    /// wrong password, [`AdminError::AccountInactive`] for an account that
    /// is not active, and [`AdminError::Persistence`] on store failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession, AdminError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AdminError::InvalidCredentials);
        }
        let Some(account) = self.store.find_admin(username).await? else {
            tracing::info!(username, "login rejected: unknown user");
            return Err(AdminError::InvalidCredentials);
        };
        if account.password != password {
            tracing::info!(username, "login rejected: wrong password");
            return Err(AdminError::InvalidCredentials);
        }
        if account.status != AdminStatus::Active {
            tracing::info!(username, status = account.status.as_str(), "login rejected: inactive");
            return Err(AdminError::AccountInactive);
        }
        tracing::info!(admin_id = %account.id, username, "admin logged in");
        Ok(AdminSession::from(&account))
    }
}
