// Session gate: turns request cookies into an authenticated identity

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{
    cookie::SESSION_COOKIE_NAME,
    error::{AuthError, Unauthenticated},
    models::{Identity, Role},
    token::TokenService,
};

/// Validates the session cookie of a request
#[derive(Clone)]
pub struct SessionGate {
    tokens: Arc<TokenService>,
}

impl SessionGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Authenticate the request carrying `jar` at time `now`
    pub fn authenticate(&self, jar: &CookieJar, now: DateTime<Utc>) -> Result<Identity, Unauthenticated> {
        let token = jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or(Unauthenticated::Missing)?;

        let identity = self.tokens.validate(token, now)?;
        Ok(identity)
    }
}

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    /// Coarse role check for handlers restricted to one role
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        if self.0.role != required {
            return Err(AuthError::Forbidden {
                required,
                actual: self.0.role,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    SessionGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = SessionGate::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let identity = gate.authenticate(&jar, Utc::now())?;
        debug!(
            user_id = identity.user_id,
            role = %identity.role,
            path = %parts.uri.path(),
            "Request authenticated"
        );

        Ok(AuthenticatedUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::SessionToken;
    use crate::config::SigningSecret;
    use axum::http::{header, Request};
    use axum_extra::extract::cookie::Cookie;
    use chrono::Duration;

    #[derive(Clone)]
    struct TestState {
        gate: SessionGate,
    }

    impl FromRef<TestState> for SessionGate {
        fn from_ref(state: &TestState) -> Self {
            state.gate.clone()
        }
    }

    fn test_token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            &SigningSecret::new("test_secret_key_for_testing_purposes").unwrap(),
        ))
    }

    fn issue(tokens: &TokenService, identity: &Identity, now: DateTime<Utc>) -> SessionToken {
        tokens.issue(identity, now).unwrap()
    }

    fn jar_with(value: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(SESSION_COOKIE_NAME, value.to_string()))
    }

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_missing_cookie() {
        let gate = SessionGate::new(test_token_service());
        assert_eq!(gate.authenticate(&CookieJar::new(), Utc::now()), Err(Unauthenticated::Missing));
        assert_eq!(gate.authenticate(&jar_with(""), Utc::now()), Err(Unauthenticated::Missing));
    }

    #[test]
    fn test_valid_cookie_yields_identity() {
        let tokens = test_token_service();
        let gate = SessionGate::new(tokens.clone());
        let identity = Identity::new(11, Role::Admin);
        let now = Utc::now();
        let token = issue(&tokens, &identity, now);

        assert_eq!(gate.authenticate(&jar_with(token.as_str()), now), Ok(identity));
    }

    #[test]
    fn test_invalid_and_expired_cookies() {
        let tokens = test_token_service();
        let gate = SessionGate::new(tokens.clone());
        let now = Utc::now();

        assert_eq!(gate.authenticate(&jar_with("garbage"), now), Err(Unauthenticated::Invalid));

        let other = TokenService::new(&SigningSecret::new("another-secret").unwrap());
        let foreign = issue(&other, &Identity::new(1, Role::User), now);
        assert_eq!(
            gate.authenticate(&jar_with(foreign.as_str()), now),
            Err(Unauthenticated::Invalid)
        );

        let stale = issue(&tokens, &Identity::new(1, Role::User), now - Duration::hours(25));
        assert_eq!(gate.authenticate(&jar_with(stale.as_str()), now), Err(Unauthenticated::Expired));
    }

    #[test]
    fn test_require_role() {
        let user = AuthenticatedUser(Identity::new(1, Role::User));
        assert!(user.require_role(Role::User).is_ok());
        match user.require_role(Role::Admin) {
            Err(AuthError::Forbidden { required, actual }) => {
                assert_eq!(required, Role::Admin);
                assert_eq!(actual, Role::User);
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extractor_accepts_session_cookie() {
        let tokens = test_token_service();
        let state = TestState { gate: SessionGate::new(tokens.clone()) };
        let identity = Identity::new(42, Role::User);
        let token = issue(&tokens, &identity, Utc::now());

        let cookie = format!("theme=dark; {}={}", SESSION_COOKIE_NAME, token.as_str());
        let mut parts = parts_with_cookie(Some(&cookie));
        let user = AuthenticatedUser::from_request_parts(&mut parts, &state).await.unwrap();

        assert_eq!(user.identity(), &identity);
    }

    #[tokio::test]
    async fn test_extractor_rejects_missing_cookie() {
        let state = TestState { gate: SessionGate::new(test_token_service()) };
        let mut parts = parts_with_cookie(None);

        let err = AuthenticatedUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(Unauthenticated::Missing)));
    }

    #[tokio::test]
    async fn test_extractor_rejects_bad_token() {
        let state = TestState { gate: SessionGate::new(test_token_service()) };
        let cookie = format!("{}=eyJhbGciOiJIUzI1NiJ9.e30.c2ln", SESSION_COOKIE_NAME);
        let mut parts = parts_with_cookie(Some(&cookie));

        let err = AuthenticatedUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(Unauthenticated::Invalid)));
    }
}
