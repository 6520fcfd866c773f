//! Caseflow Backend
//!
//! A REST + WebSocket backend for DFIR case management: case summaries with
//! collaborative editing, activity logging, export, and status tracking.

mod api;
mod auth;
mod collab;
mod config;
mod db;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use collab::CollabRegistry;
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub collab: Arc<CollabRegistry>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Caseflow Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Seed the bootstrap administrator on first start
    match &config.admin_api_key {
        Some(key) if !repo.has_users().await? => {
            let admin = repo.create_user("administrator", "Administrator", Some(key)).await?;
            tracing::info!("Seeded bootstrap administrator (user id {})", admin.id);
        }
        Some(_) => {}
        None => {
            tracing::warn!(
                "No admin API key configured (CASEFLOW_ADMIN_API_KEY). \
                 Machine clients cannot authenticate until a key is provisioned!"
            );
        }
    }

    // Create application state
    let state = AppState {
        repo,
        collab: Arc::new(CollabRegistry::new()),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Case routes, gated by the authentication layer
    let case_routes = Router::new()
        .route("/case", get(api::case_overview))
        .route("/case/exists", get(api::case_exists_check))
        .route("/case/pipelines-modal", get(api::pipelines_modal))
        .route("/case/summary/update", post(api::summary_update))
        .route("/case/summary/fetch", get(api::summary_fetch))
        .route("/case/activities/list", get(api::activity_list))
        .route("/case/export", get(api::export_case))
        .route("/case/tasklog/add", post(api::tasklog_add))
        .route("/case/users/list", get(api::case_users))
        .route("/case/update-status", post(api::update_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer));

    // The collaboration channel resolves its identity itself: the upgrade is
    // accepted for everyone and unauthenticated events are dropped silently.
    let ws_routes = Router::new().route("/case/ws", get(api::collab_ws));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(case_routes)
        .merge(ws_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
