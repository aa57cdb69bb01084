// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

/// Role carried by every identity and token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role string is not one of the known roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Authenticated identity, either loaded from the store or decoded from a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub user_id: u64,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: u64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// User credential row as stored in the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Build the identity for this record.
    ///
    /// Returns `None` when the row holds a negative id or a role outside the
    /// known set, both of which mean the store is corrupt.
    pub fn identity(&self) -> Option<Identity> {
        let user_id = u64::try_from(self.id).ok()?;
        let role = self.role.parse().ok()?;
        Some(Identity { user_id, role })
    }
}

/// Values needed to insert a new credential record
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Sign-up form. Missing fields read as empty and fail the usual checks.
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(default)]
pub struct SignUpForm {
    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    pub username: String,
    pub password: String,
}

/// Login form. Missing fields read as empty and never match a user.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Result of a login attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The request already carried a valid session; nothing was issued
    AlreadyAuthenticated(Identity),
    /// Credentials were checked and a fresh session cookie was added
    LoggedIn(Identity),
}
