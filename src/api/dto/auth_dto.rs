//! Login request and admin identity DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::AdminSession;

/// Request body for `POST /auth/login`.
#[derive(Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The logged-in admin, as shown in the panel header.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminDto {
    /// Admin identifier.
    pub id: uuid::Uuid,
    /// Login name.
    pub username: String,
    /// Account status (`active`, `inactive` or `suspended`).
    pub status: String,
}

impl From<&AdminSession> for AdminDto {
    fn from(admin: &AdminSession) -> Self {
        Self {
            id: admin.id.into(),
            username: admin.username.clone(),
            status: admin.status.as_str().to_string(),
        }
    }
}
