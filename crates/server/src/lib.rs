//! MediAI Clinical Assistant Server
//!
//! Session-authenticated backend for the MediAI web app: sealed-cookie
//! auth, per-user medical records, and an AI chat relay.

pub mod assistant;
pub mod auth;
pub mod config;
pub mod error;
pub mod records;
pub mod store;

use axum::{
    middleware,
    response::Html,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{AppState, ServerConfig};

/// Build the full application router for the given state.
///
/// Exposed separately from [`run`] so tests can drive the router
/// directly with their own configuration.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Page shells; rendering is the frontend's job, these exist as
        // guard targets
        .route("/", get(landing_page))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/main", get(main_page))
        // Auth endpoints
        .route("/api/register", post(auth::handlers::register))
        .route("/api/login", post(auth::handlers::login))
        .route("/api/logout", post(auth::handlers::logout))
        .route("/api/me", get(auth::handlers::me))
        // Assistant + records
        .route("/api/chat", post(assistant::chat))
        .route(
            "/api/medical-records",
            get(records::list_records).post(records::create_record),
        )
        // Health check
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::guard,
        ))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== MediAI Server ===");

    let config = ServerConfig::from_env()?;
    info!("Database: {:?}", config.database_path);
    info!("Model: {}", config.model);

    let state = AppState::new(&config).await?;
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK - MediAI Server"
}

async fn landing_page() -> Html<&'static str> {
    Html("<!doctype html><title>MediAI</title><h1>MediAI</h1>")
}

async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Login - MediAI</title><h1>Login</h1>")
}

async fn register_page() -> Html<&'static str> {
    Html("<!doctype html><title>Register - MediAI</title><h1>Register</h1>")
}

async fn main_page() -> Html<&'static str> {
    Html("<!doctype html><title>MediAI Dashboard</title><h1>Dashboard</h1>")
}
