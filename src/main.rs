use std::sync::Arc;

use judge_auth::{
    auth::{AuthService, PgUserRepository, TokenService},
    config::AppConfig,
    create_router, db, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Judge Auth - Starting...");

    // A missing or empty signing secret stops the process here
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let tokens = Arc::new(TokenService::new(&config.signing_secret));
    let users = Arc::new(PgUserRepository::new(db_pool));
    let auth = AuthService::new(users, tokens, config.default_role);

    let app = create_router(AppState::new(auth));

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Judge Auth is running on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
