// Session cookie construction

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use time::OffsetDateTime;

use crate::auth::token::SessionToken;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "session_token";

fn to_offset_datetime(at: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(at.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn base_cookie(value: String, expires: DateTime<Utc>) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .expires(to_offset_datetime(expires))
        .build()
}

/// Cookie carrying `token`, expiring together with it
pub fn session_cookie(token: &SessionToken) -> Cookie<'static> {
    base_cookie(token.as_str().to_string(), token.expires_at())
}

/// Empty cookie dated an hour before `now`, overwriting any session cookie
pub fn cleared_session_cookie(now: DateTime<Utc>) -> Cookie<'static> {
    base_cookie(String::new(), now - Duration::hours(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Identity, Role};
    use crate::auth::token::TokenService;
    use crate::config::SigningSecret;
    use chrono::TimeZone;

    #[test]
    fn test_session_cookie_attributes() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 0).unwrap();
        let service = TokenService::new(&SigningSecret::new("cookie-test").unwrap());
        let token = service.issue(&Identity::new(1, Role::User), now).unwrap();

        let cookie = session_cookie(&token);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), token.as_str());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(
            cookie.expires_datetime().map(|at| at.unix_timestamp()),
            Some(token.expires_at().timestamp())
        );
    }

    #[test]
    fn test_cleared_cookie_is_in_the_past() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 0).unwrap();
        let cookie = cleared_session_cookie(now);

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        let expires = cookie.expires_datetime().unwrap();
        assert!(expires.unix_timestamp() < now.timestamp());
    }
}
