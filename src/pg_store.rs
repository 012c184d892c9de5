//! PostgreSQL-backed [`ItemStore`] implementation.
//!
//! Every operation is a single statement against the `items` table, so
//! atomicity comes from PostgreSQL itself: `INSERT ... RETURNING` for ids,
//! and single-row `UPDATE`/`DELETE` keyed by primary key.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use item_store_core::models::{Item, NewItem};
use item_store_core::store::ItemStore;

const ITEM_COLUMNS: &str =
    "id, title, COALESCE(description, '') AS description, created_at, updated_at";

/// PostgreSQL implementation of the [`ItemStore`] trait.
///
/// Wraps a [`PgPool`]; clones of the pool share the same bounded set of
/// connections.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn item_from_row(row: &PgRow) -> Result<Item> {
    Ok(Item {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ItemStore for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, limit: i64) -> Result<Vec<Item>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items ORDER BY created_at DESC, id DESC LIMIT $1",
            ITEM_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Item>> {
        let row = sqlx::query(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn insert(&self, new_item: &NewItem) -> Result<Item> {
        let row = sqlx::query(&format!(
            "INSERT INTO items (title, description) VALUES ($1, $2) RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(&new_item.title)
        .bind(&new_item.description)
        .fetch_one(&self.pool)
        .await?;

        item_from_row(&row)
    }

    async fn update(&self, id: i64, new_item: &NewItem) -> Result<Option<Item>> {
        // GREATEST keeps updated_at moving forward even when two writes land
        // within the same clock tick.
        let row = sqlx::query(&format!(
            r#"
            UPDATE items
            SET title = $1,
                description = $2,
                updated_at = GREATEST(CURRENT_TIMESTAMP, updated_at + INTERVAL '1 microsecond')
            WHERE id = $3
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&new_item.title)
        .bind(&new_item.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
