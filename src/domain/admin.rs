//! Admin accounts and the identity stored in an authenticated session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AdminId;

/// Account status of an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    /// May use the panel.
    Active,
    /// Disabled by another admin.
    Inactive,
    /// Temporarily blocked.
    Suspended,
}

impl AdminStatus {
    /// Returns the status as stored in the `admin.status` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            other => Err(format!("unknown admin status: {other}")),
        }
    }
}

/// Admin row including the stored credential, as loaded for login.
#[derive(Clone)]
pub struct AdminAccount {
    /// Row identifier.
    pub id: AdminId,
    /// Login name.
    pub username: String,
    /// Stored password.
    pub password: String,
    /// Account status.
    pub status: AdminStatus,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("status", &self.status)
            .finish()
    }
}

/// Identity kept in the server-side session after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// Admin identifier.
    pub id: AdminId,
    /// Login name, shown in the panel header.
    pub username: String,
    /// Status at login time; checked by the gate on every request.
    pub status: AdminStatus,
}

impl AdminSession {
    /// Returns `true` if the session grants access to protected views.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AdminStatus::Active
    }
}

impl From<&AdminAccount> for AdminSession {
    fn from(account: &AdminAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            status: account.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let account = AdminAccount {
            id: AdminId::new(),
            username: "root".to_string(),
            password: "hunter2".to_string(),
            status: AdminStatus::Active,
        };
        let printed = format!("{account:?}");
        assert!(!printed.contains("hunter2"));
        assert!(AdminSession::from(&account).is_active());
    }

    #[test]
    fn suspended_session_is_not_active() {
        let session = AdminSession {
            id: AdminId::new(),
            username: "ops".to_string(),
            status: AdminStatus::Suspended,
        };
        assert!(!session.is_active());
    }
}
