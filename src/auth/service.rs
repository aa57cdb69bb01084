// Authentication service - sign-up, login and logout flows

use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{
    cookie::{cleared_session_cookie, session_cookie},
    error::AuthError,
    middleware::SessionGate,
    models::{CredentialRecord, Identity, LoginOutcome, NewCredential, Role},
    password::{HashedPassword, PasswordService, MIN_PASSWORD_LENGTH},
    repository::UserStore,
    token::TokenService,
};

/// Authentication service coordinating all auth operations
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    passwords: PasswordService,
    tokens: Arc<TokenService>,
    gate: SessionGate,
    default_role: Role,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>, default_role: Role) -> Self {
        Self {
            users,
            passwords: PasswordService,
            gate: SessionGate::new(tokens.clone()),
            tokens,
            default_role,
        }
    }

    pub fn session_gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Register a new user with the default role.
    ///
    /// No session is issued; the user logs in separately.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<CredentialRecord, AuthError> {
        if self.users.find_by_username(username).await?.is_some() {
            warn!(username, "Sign-up rejected: username already exists");
            return Err(AuthError::Conflict);
        }

        if !self.passwords.is_acceptable(password) {
            return Err(AuthError::InvalidPassword {
                min_length: MIN_PASSWORD_LENGTH,
            });
        }

        let password_hash = self
            .passwords
            .hash_password_blocking(password.to_string())
            .await?;

        // the store still rejects a concurrent duplicate with Conflict
        let record = self
            .users
            .create(NewCredential {
                username: username.to_string(),
                password_hash: password_hash.into_string(),
                role: self.default_role,
            })
            .await?;

        info!(user_id = record.id, username, role = %self.default_role, "User registered");
        Ok(record)
    }

    /// Log a user in, reusing the session already present in `jar` if it is valid
    pub async fn login(
        &self,
        jar: CookieJar,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(CookieJar, LoginOutcome), AuthError> {
        if let Ok(identity) = self.gate.authenticate(&jar, now) {
            return Ok((jar, LoginOutcome::AlreadyAuthenticated(identity)));
        }

        let identity = self.check_credentials(username, password).await?;
        let token = self.tokens.issue(&identity, now)?;

        info!(user_id = identity.user_id, role = %identity.role, "User logged in");
        Ok((jar.add(session_cookie(&token)), LoginOutcome::LoggedIn(identity)))
    }

    /// Clear the session cookie. There is no server-side state to drop.
    pub fn logout(&self, jar: CookieJar, now: DateTime<Utc>) -> CookieJar {
        jar.add(cleared_session_cookie(now))
    }

    async fn check_credentials(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let Some(record) = self.users.find_by_username(username).await? else {
            // same Argon2 cost as a wrong password, so timing does not reveal the username
            self.passwords.verify_dummy_blocking(password.to_string()).await;
            warn!("Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let hashed = HashedPassword::from(record.password_hash.clone());
        if !self
            .passwords
            .verify_password_blocking(hashed, password.to_string())
            .await
        {
            warn!("Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        record.identity().ok_or_else(|| {
            AuthError::Database(format!("user {} has an unreadable id or role", record.id))
        })
    }
}
