pub mod auth;
pub mod config;
pub mod db;

use axum::{
    extract::FromRef,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use auth::{
    models::{Identity, LoginForm, Role, SignUpForm},
    AuthService, SessionGate,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::sign_up_handler,
        auth::handlers::login_handler,
        auth::handlers::logout_handler,
        auth::handlers::me_handler,
    ),
    components(schemas(Identity, Role, SignUpForm, LoginForm)),
    tags(
        (name = "auth", description = "Sign-up, login and cookie sessions")
    ),
    info(
        title = "Judge Auth API",
        version = "0.1.0",
        description = "Credential verification and session tokens for the coding judge"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for SessionGate {
    fn from_ref(state: &AppState) -> Self {
        state.auth.session_gate().clone()
    }
}

/// Handler for GET /health
async fn health_handler() -> &'static str {
    "OK"
}

/// Handler for GET /api-docs/openapi.json
async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    use auth::{login_handler, logout_handler, me_handler, sign_up_handler};

    Router::new()
        .route("/signup", post(sign_up_handler))
        .route("/login", post(login_handler))
        .route("/logout", get(logout_handler).post(logout_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/health", get(health_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
