// HTTP handlers for authentication endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{Identity, LoginForm, LoginOutcome, SignUpForm},
    service::AuthService,
};

/// Where logout sends the browser
pub const LOGIN_PAGE: &str = "/login";

/// Register a new user
/// POST /signup
#[utoipa::path(
    post,
    path = "/signup",
    request_body(content = SignUpForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User registered", body = String),
        (status = 400, description = "Invalid username or password too short"),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Hashing or store failure")
    ),
    tag = "auth"
)]
pub async fn sign_up_handler(
    State(service): State<Arc<AuthService>>,
    Form(form): Form<SignUpForm>,
) -> Result<String, AuthError> {
    form.validate()?;
    service.sign_up(&form.username, &form.password).await?;
    Ok(format!("User {} successfully registered!", form.username))
}

/// Log a user in and set the session cookie
/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in, or already logged in", body = String),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Token issuance or store failure")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    form: Option<Form<LoginForm>>,
) -> Result<(CookieJar, String), AuthError> {
    // a valid session wins even without a body; otherwise an absent form is bad credentials
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let (jar, outcome) = service
        .login(jar, &form.username, &form.password, Utc::now())
        .await?;

    let message = match outcome {
        LoginOutcome::AlreadyAuthenticated(identity) => format!(
            "Already logged in as user {} with role {}.",
            identity.user_id, identity.role
        ),
        LoginOutcome::LoggedIn(_) => "Login successful.".to_string(),
    };

    Ok((jar, message))
}

/// Clear the session cookie and redirect to the login page
/// GET|POST /logout
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 302, description = "Session cookie cleared, redirect to /login")
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let jar = service.logout(jar, Utc::now());
    info!("Session cookie cleared");
    (StatusCode::FOUND, jar, [(header::LOCATION, LOGIN_PAGE)])
}

/// Identity of the current session
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Missing, invalid or expired session")
    ),
    tag = "auth"
)]
pub async fn me_handler(user: AuthenticatedUser) -> Json<Identity> {
    Json(user.0)
}
