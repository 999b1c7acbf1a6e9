use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// A request waiting longer than this for a connection fails instead of queuing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Connects the record store pool (`profiles` + `optimizations`).
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = pool_options(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to the record store")?;

    info!("Record store pool ready (max {max_connections} connections)");
    Ok(pool)
}
