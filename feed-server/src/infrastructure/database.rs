use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::data::postgres::PostgresStore;

const MAX_CONNECTIONS: u32 = 20;

/// Opens the pool, applies pending migrations and hands back the store.
pub async fn connect_postgres(database_url: &str) -> anyhow::Result<PostgresStore> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to apply migrations")?;
    info!(max_connections = MAX_CONNECTIONS, "PostgreSQL ready");

    Ok(PostgresStore::new(pool))
}
