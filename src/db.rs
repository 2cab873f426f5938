/// SQLite connection management
///
/// Opens the single application database and makes sure every table the storage
/// layers rely on exists before the pool is handed out.

use crate::config::DatabaseConfig;
use crate::resource::storage::ResourceStorage;
use crate::task::storage::MetaDocStorage;
use crate::workflow::storage::WorkflowStorage;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// Database file name inside the configured data directory
pub const DATABASE_FILE: &str = "stagecraft.db";

/// Open (creating if missing) the application database and initialize its schema
pub async fn open(config: &DatabaseConfig) -> Result<SqlitePool> {
    let data_dir = Path::new(&config.data_dir);
    std::fs::create_dir_all(data_dir).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create data directory '{}': {}",
            data_dir.display(),
            e
        )
    })?;
    let db_path = data_dir.join(DATABASE_FILE);

    tracing::info!("🗄️ Opening database: {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;

    tracing::info!("✅ Database ready: {}", db_path.display());

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Pinned to a single connection that never expires, since every SQLite
/// in-memory connection is its own database.
pub async fn open_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all application tables (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    WorkflowStorage::new(pool.clone()).init_schema().await?;
    ResourceStorage::new(pool.clone()).init_schema().await?;
    MetaDocStorage::new(pool.clone()).init_schema().await?;
    Ok(())
}
