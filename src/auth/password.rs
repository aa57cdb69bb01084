// Password hashing and validation service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::fmt;
use std::sync::OnceLock;
use tracing::{error, warn};

use crate::auth::error::AuthError;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Stand-in hash verified when a login names an unknown user, so both
/// failure paths pay for one Argon2 verification
static DUMMY_HASH: OnceLock<HashedPassword> = OnceLock::new();

/// Argon2 hash in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for HashedPassword {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

/// Password service for hashing and verification
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with the crate's default cost
    pub fn hash_password(&self, password: &str) -> Result<HashedPassword, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .to_string();

        Ok(HashedPassword(hash))
    }

    /// Verify a password against a stored hash.
    ///
    /// Mismatches and unreadable hashes both return `false`.
    pub fn verify_password(&self, hashed: &HashedPassword, password: &str) -> bool {
        let parsed = match PasswordHash::new(hashed.as_str()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Hash a password on the blocking pool
    pub async fn hash_password_blocking(&self, password: String) -> Result<HashedPassword, AuthError> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    /// Verify a password on the blocking pool
    pub async fn verify_password_blocking(&self, hashed: HashedPassword, password: String) -> bool {
        let service = *self;
        match tokio::task::spawn_blocking(move || service.verify_password(&hashed, &password)).await {
            Ok(matches) => matches,
            Err(e) => {
                error!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// Run a full verification against the stand-in hash and discard the result
    pub async fn verify_dummy_blocking(&self, password: String) {
        let service = *self;
        let outcome = tokio::task::spawn_blocking(move || {
            service
                .dummy_hash()
                .map(|hash| service.verify_password(&hash, &password))
        })
        .await;

        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Stand-in password hash unavailable: {}", e),
            Err(e) => error!("Password verification task failed: {}", e),
        }
    }

    /// Argon2 hash of a random value, computed once per process
    pub fn dummy_hash(&self) -> Result<HashedPassword, AuthError> {
        if let Some(hash) = DUMMY_HASH.get() {
            return Ok(hash.clone());
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self.hash_password(salt.as_str())?;
        // a concurrent initialiser may win, either value is fine
        Ok(DUMMY_HASH.get_or_init(|| hash).clone())
    }

    /// The only strength rule: at least `MIN_PASSWORD_LENGTH` characters
    pub fn is_acceptable(&self, password: &str) -> bool {
        password.chars().count() >= MIN_PASSWORD_LENGTH
    }
}
