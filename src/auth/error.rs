// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::auth::models::Role;

/// Reasons a session token is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

/// Reasons a request carries no usable session
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Unauthenticated {
    #[error("missing session cookie")]
    Missing,
    #[error("invalid session token")]
    Invalid,
    #[error("session has expired")]
    Expired,
}

impl From<TokenError> for Unauthenticated {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Unauthenticated::Expired,
            TokenError::Malformed | TokenError::BadSignature => Unauthenticated::Invalid,
        }
    }
}

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Password must be at least {min_length} characters long")]
    InvalidPassword { min_length: usize },

    #[error("Username already exists")]
    Conflict,

    /// Unknown user and wrong password share this variant
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] Unauthenticated),

    #[error("Insufficient permissions: required role '{required}', but user has role '{actual}'")]
    Forbidden { required: Role, actual: Role },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token issuance error: {0}")]
    TokenIssuance(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for field '{}'", field),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        AuthError::Validation(message)
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidPassword { .. } => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenIssuance(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to send to clients (no internal details)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::PasswordHash(_) | AuthError::TokenIssuance(_) | AuthError::Database(_) => {
                "Internal server error".to_string()
            }
            AuthError::Forbidden { required, .. } => {
                format!("Insufficient permissions: required role '{}'", required)
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Unauthenticated(reason) => warn!(%reason, "Rejected unauthenticated request"),
            AuthError::Forbidden { required, actual } => {
                warn!(%required, %actual, "Authorization failed")
            }
            AuthError::PasswordHash(msg) => error!("Password hashing error: {}", msg),
            AuthError::TokenIssuance(msg) => error!("Token issuance error: {}", msg),
            AuthError::Database(msg) => error!("Database error in auth: {}", msg),
            _ => {}
        }

        let body = Json(json!({
            "error": self.error_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_maps_to_unauthenticated() {
        assert_eq!(Unauthenticated::from(TokenError::Expired), Unauthenticated::Expired);
        assert_eq!(Unauthenticated::from(TokenError::Malformed), Unauthenticated::Invalid);
        assert_eq!(Unauthenticated::from(TokenError::BadSignature), Unauthenticated::Invalid);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Unauthenticated(Unauthenticated::Missing).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidPassword { min_length: 8 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::TokenIssuance("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AuthError::Database("connection refused on 10.0.0.3".into());
        assert_eq!(err.error_message(), "Internal server error");
        let err = AuthError::PasswordHash("rng failure".into());
        assert_eq!(err.error_message(), "Internal server error");
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(AuthError::InvalidCredentials.error_message(), "Invalid credentials");
    }
}
