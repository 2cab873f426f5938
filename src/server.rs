/// Server setup and initialization
///
/// Wires together storage, the generator and HTTP routes.
/// Provides the main application factory function for creating the Axum app.

use crate::{
    api::{
        cors_headers, create_resource_routes, create_task_routes, create_workflow_routes,
        AppState,
    },
    config::Config,
    db,
};
use anyhow::Result;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;

/// Create the main Axum application with all routes and middleware
///
/// Opens the database (creating the schema if needed) and builds the router.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("📁 Ensuring data directory exists: {}", config.database.data_dir);
    let pool = db::open(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;

    tracing::info!(
        "🧩 Initializing workflow generator (input policy: {:?})",
        config.generator.input_policy
    );
    let state = AppState::new(pool, config.generator);

    tracing::info!("✅ Application initialized successfully");

    Ok(build_router(state))
}

/// Build the router over an existing application state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Workflow generation and definitions
        .merge(create_workflow_routes())
        // Resource listing
        .merge(create_resource_routes())
        // Task meta documents
        .merge(create_task_routes())
        .with_state(state)
        .layer(middleware::map_response(cors_headers))
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Stagecraft server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
