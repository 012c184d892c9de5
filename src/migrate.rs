use anyhow::{Context, Result};
use sqlx::PgPool;

/// Creates the `items` table and its list index. Safe to run repeatedly.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create items table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_created_at ON items(created_at DESC)")
        .execute(pool)
        .await
        .context("Failed to create idx_items_created_at")?;

    tracing::debug!("schema up to date");
    Ok(())
}
