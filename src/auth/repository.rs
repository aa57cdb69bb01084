// Credential store: the trait the auth flow talks to and its implementations

use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::{
    error::AuthError,
    models::{CredentialRecord, NewCredential},
};

/// Lookup and creation of credential records.
///
/// Implementations must reject a duplicate username atomically with
/// `AuthError::Conflict`, even when two inserts race.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AuthError>;

    async fn create(&self, credential: NewCredential) -> Result<CredentialRecord, AuthError>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AuthError> {
        let user = sqlx::query_as::<_, CredentialRecord>(
            "SELECT id, username, password_hash, role, created_at, updated_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, credential: NewCredential) -> Result<CredentialRecord, AuthError> {
        sqlx::query_as::<_, CredentialRecord>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .bind(credential.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::Conflict;
                }
            }
            AuthError::Database(e.to_string())
        })
    }
}

#[cfg(test)]
pub use memory::InMemoryUserStore;
