// Session token issuance and validation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::auth::{
    error::{AuthError, TokenError},
    models::{Identity, Role},
};
use crate::config::SigningSecret;

/// Lifetime of a session token
pub const SESSION_TTL_HOURS: i64 = 24;

/// Only algorithm accepted in a token header
const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub role: Role,
    pub iat: i64, // issued at, unix seconds
    pub exp: i64, // expires at, unix seconds
}

#[derive(Deserialize)]
struct HeaderAlgorithm {
    alg: String,
}

/// Signed token handed to the client, with its expiry
#[derive(Debug, Clone)]
pub struct SessionToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

/// Token service for JWT operations
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a TokenService signing with `secret`; tokens live 24 hours
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // expiry is checked against the caller's clock in `validate`
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    /// Issue a signed token for `identity`, valid from `now` for the TTL
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<SessionToken, AuthError> {
        let expires_at = now + self.ttl;

        let claims = Claims {
            user_id: identity.user_id,
            role: identity.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let value = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;

        Ok(SessionToken { value, expires_at })
    }

    /// Validate a token at time `now` and return the identity it carries.
    ///
    /// The header algorithm and the signature are checked before any claim
    /// is read; expiry is checked last.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let claims = self.verified_claims(token)?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Identity::new(claims.user_id, claims.role))
    }

    fn verified_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let header = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(_), Some(_), None) => header,
            _ => return Err(TokenError::Malformed),
        };

        let header = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::Malformed)?;
        let header: HeaderAlgorithm =
            serde_json::from_slice(&header).map_err(|_| TokenError::Malformed)?;
        if header.alg != ALGORITHM_NAME {
            return Err(TokenError::BadSignature);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            })
    }
}
