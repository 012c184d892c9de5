//! In-memory [`ItemStore`] implementation for tests and local demos.
//!
//! Items live in a `BTreeMap` behind `std::sync::RwLock`. Ids come from a
//! counter that is never reused, even after deletes.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::models::{Item, NewItem};

use super::ItemStore;

struct Inner {
    items: BTreeMap<i64, Item>,
    next_id: i64,
}

/// In-memory item store.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored items. A poisoned lock still reports the items it
    /// holds.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

/// Returns a timestamp strictly after `previous`, using the wall clock when
/// it has already moved past it.
fn advance_from(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        self.inner.read().map(|_| ()).map_err(poisoned)
    }

    async fn list(&self, limit: i64) -> Result<Vec<Item>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut items: Vec<Item> = inner.items.values().cloned().collect();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn get(&self, id: i64) -> Result<Option<Item>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.items.get(&id).cloned())
    }

    async fn insert(&self, new_item: &NewItem) -> Result<Item> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = Utc::now();
        let item = Item {
            id,
            title: new_item.title.clone(),
            description: new_item.description.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.items.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: i64, new_item: &NewItem) -> Result<Option<Item>> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let item = match inner.items.get_mut(&id) {
            Some(item) => item,
            None => return Ok(None),
        };
        item.title = new_item.title.clone();
        item.description = new_item.description.clone();
        item.updated_at = advance_from(item.updated_at);
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(inner.items.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(title: &str) -> NewItem {
        NewItem {
            title: title.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let a = store.insert(&new_item("a")).await.unwrap();
        let b = store.insert(&new_item("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = InMemoryStore::new();
        let a = store.insert(&new_item("a")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.insert(&new_item("b")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_capped() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.insert(&new_item(&format!("item {}", i))).await.unwrap();
        }
        let items = store.list(3).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "item 4");
        assert_eq!(items[2].title, "item 2");
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.update(42, &new_item("x")).await.unwrap().is_none());
        assert!(!store.delete(42).await.unwrap());
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_advances_updated_at() {
        let store = InMemoryStore::new();
        let created = store.insert(&new_item("before")).await.unwrap();
        let updated = store
            .update(created.id, &new_item("after"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_len_survives_poisoned_lock() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        store.insert(&new_item("a")).await.unwrap();
        store.insert(&new_item("b")).await.unwrap();

        let poisoner = store.clone();
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.inner.write().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(store.inner.is_poisoned());

        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
        assert!(store.ping().await.is_err());
    }

    #[test]
    fn test_advance_from_future_timestamp() {
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(advance_from(future), future + Duration::microseconds(1));
    }
}
