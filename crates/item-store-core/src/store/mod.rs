//! Storage abstraction for items.
//!
//! The [`ItemStore`] trait defines every storage operation the service
//! needs, enabling pluggable backends (PostgreSQL, in-memory).
//!
//! Each method corresponds to a single atomic statement in a SQL backend.
//! Id generation, uniqueness and durability belong to the backend; callers
//! hold no state between calls. Implementations must be `Send + Sync` so
//! one instance can be shared by every in-flight request.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Item, NewItem};

/// Maximum number of items returned by a list query.
pub const LIST_LIMIT: i64 = 100;

/// Abstract storage backend for items.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`ping`](ItemStore::ping) | Liveness probe against the backend |
/// | [`list`](ItemStore::list) | Newest-first items, capped at `limit` |
/// | [`get`](ItemStore::get) | Fetch one item by id |
/// | [`insert`](ItemStore::insert) | Insert and return the stored item |
/// | [`update`](ItemStore::update) | Overwrite title/description, refresh `updated_at` |
/// | [`delete`](ItemStore::delete) | Remove one item by id |
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Checks that the backend can serve queries.
    async fn ping(&self) -> Result<()>;

    /// Returns at most `limit` items ordered by `created_at` descending,
    /// ties broken by `id` descending.
    async fn list(&self, limit: i64) -> Result<Vec<Item>>;

    /// Returns the item with `id`, or `None` when no row matches.
    async fn get(&self, id: i64) -> Result<Option<Item>>;

    /// Inserts a new item. The returned item carries the generated id and
    /// equal `created_at`/`updated_at`.
    async fn insert(&self, new_item: &NewItem) -> Result<Item>;

    /// Replaces title and description of item `id` and moves `updated_at`
    /// strictly forward. Returns `None` when no row matches.
    async fn update(&self, id: i64, new_item: &NewItem) -> Result<Option<Item>>;

    /// Deletes item `id`. Returns `false` when no row matched.
    async fn delete(&self, id: i64) -> Result<bool>;
}
