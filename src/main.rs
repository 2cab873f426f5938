/// Stagecraft server entry point
///
/// Loads configuration from the environment and serves:
/// - Workflow generation and definitions at /api/workflows/*
/// - Resource listing at /api/resources
/// - Task meta documents at /api/tasks/{task_id}/metadocs
/// - Health check at /healthz

use stagecraft::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3004 and data/stagecraft.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
