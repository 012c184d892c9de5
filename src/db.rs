use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::{Config, DbConfig};

pub fn connect_options(db: &DbConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .username(&db.user)
        .password(&db.password)
        .database(&db.name)
}

/// Opens the shared connection pool and checks that the server answers.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let db = &config.db;

    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        // Bounds how long a health probe waits when the server is gone.
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options(db))
        .await
        .with_context(|| {
            format!(
                "Failed to connect to postgres at {}:{}/{}",
                db.host, db.port, db.name
            )
        })?;

    tracing::info!(host = %db.host, port = db.port, database = %db.name, "database connected");
    Ok(pool)
}
