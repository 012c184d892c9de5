//! Item operations on top of an [`ItemStore`].
//!
//! [`ItemService`] is what transports call. It validates input before any
//! storage access, turns missing rows into [`ItemError::NotFound`], and wraps
//! backend failures in [`ItemError::StorageUnavailable`].

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ItemError, ItemResult};
use crate::models::{DeleteConfirmation, Item, ItemInput};
use crate::store::{ItemStore, LIST_LIMIT};

/// Response of the health check.
///
/// `status` is always `"ok"` while the process serves requests; storage
/// trouble is reported through `database` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub database: String,
    pub time: String,
}

impl HealthReport {
    pub fn is_connected(&self) -> bool {
        self.database == "connected"
    }
}

/// Stateless item operations over a shared store.
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Probes the store. Never fails; a failed probe yields
    /// `database: "disconnected"`.
    pub async fn health(&self) -> HealthReport {
        let database = match self.store.ping().await {
            Ok(()) => "connected",
            Err(_) => "disconnected",
        };
        HealthReport {
            status: "ok".to_string(),
            database: database.to_string(),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Up to [`LIST_LIMIT`] items, newest first.
    pub async fn list(&self) -> ItemResult<Vec<Item>> {
        self.store.list(LIST_LIMIT).await.map_err(ItemError::storage)
    }

    pub async fn get(&self, id: i64) -> ItemResult<Item> {
        self.store
            .get(id)
            .await
            .map_err(ItemError::storage)?
            .ok_or(ItemError::NotFound(id))
    }

    pub async fn create(&self, input: ItemInput) -> ItemResult<Item> {
        let new_item = input.validate()?;
        self.store
            .insert(&new_item)
            .await
            .map_err(ItemError::storage)
    }

    /// Full replacement of title and description; there is no partial merge.
    pub async fn update(&self, id: i64, input: ItemInput) -> ItemResult<Item> {
        let new_item = input.validate()?;
        self.store
            .update(id, &new_item)
            .await
            .map_err(ItemError::storage)?
            .ok_or(ItemError::NotFound(id))
    }

    pub async fn delete(&self, id: i64) -> ItemResult<DeleteConfirmation> {
        let deleted = self.store.delete(id).await.map_err(ItemError::storage)?;
        if !deleted {
            return Err(ItemError::NotFound(id));
        }
        Ok(DeleteConfirmation::deleted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewItem;
    use crate::store::memory::InMemoryStore;
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    /// A store whose every call fails, standing in for a dropped database.
    struct DownStore;

    #[async_trait]
    impl ItemStore for DownStore {
        async fn ping(&self) -> Result<()> {
            bail!("connection refused")
        }
        async fn list(&self, _limit: i64) -> Result<Vec<Item>> {
            bail!("connection refused")
        }
        async fn get(&self, _id: i64) -> Result<Option<Item>> {
            bail!("connection refused")
        }
        async fn insert(&self, _new_item: &NewItem) -> Result<Item> {
            bail!("connection refused")
        }
        async fn update(&self, _id: i64, _new_item: &NewItem) -> Result<Option<Item>> {
            bail!("connection refused")
        }
        async fn delete(&self, _id: i64) -> Result<bool> {
            bail!("connection refused")
        }
    }

    fn memory_service() -> (ItemService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (ItemService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (service, _) = memory_service();
        let created = service
            .create(ItemInput::new("Test Item", "Testing"))
            .await
            .unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Test Item");
        assert_eq!(fetched.description, "Testing");
    }

    #[tokio::test]
    async fn test_create_invalid_has_no_side_effects() {
        let (service, store) = memory_service();
        service.create(ItemInput::new("kept", "")).await.unwrap();

        let err = service.create(ItemInput::new("", "nope")).await.unwrap_err();
        assert!(matches!(err, ItemError::InvalidInput(_)));
        let err = service.create(ItemInput::default()).await.unwrap_err();
        assert!(matches!(err, ItemError::InvalidInput(_)));

        assert_eq!(store.len(), 1);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_ids_are_not_found() {
        let (service, _) = memory_service();
        assert!(matches!(service.get(99).await, Err(ItemError::NotFound(99))));
        assert!(matches!(
            service.update(99, ItemInput::new("x", "")).await,
            Err(ItemError::NotFound(99))
        ));
        assert!(matches!(service.delete(99).await, Err(ItemError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_update_overwrites_both_fields() {
        let (service, _) = memory_service();
        let created = service
            .create(ItemInput::new("draft", "some notes"))
            .await
            .unwrap();

        let input = ItemInput {
            title: Some("final".to_string()),
            description: None,
        };
        let updated = service.update(created.id, input).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "final");
        assert_eq!(updated.description, "");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_title() {
        let (service, _) = memory_service();
        let created = service.create(ItemInput::new("keep me", "")).await.unwrap();
        let err = service
            .update(created.id, ItemInput::new("", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::InvalidInput(_)));
        assert_eq!(service.get(created.id).await.unwrap().title, "keep me");
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (service, _) = memory_service();
        let created = service.create(ItemInput::new("gone", "")).await.unwrap();

        let confirmation = service.delete(created.id).await.unwrap();
        assert_eq!(confirmation.message, "Item deleted successfully");
        assert!(matches!(service.get(created.id).await, Err(ItemError::NotFound(_))));
        assert!(matches!(service.delete(created.id).await, Err(ItemError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_caps_at_limit_newest_first() {
        let (service, _) = memory_service();
        for i in 0..(LIST_LIMIT + 5) {
            service
                .create(ItemInput::new(format!("item {}", i), ""))
                .await
                .unwrap();
        }
        let items = service.list().await.unwrap();
        assert_eq!(items.len() as i64, LIST_LIMIT);
        assert_eq!(items[0].title, format!("item {}", LIST_LIMIT + 4));
        for pair in items.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[tokio::test]
    async fn test_health_reports_store_state() {
        let (service, _) = memory_service();
        let report = service.health().await;
        assert_eq!(report.status, "ok");
        assert!(report.is_connected());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.time).is_ok());

        let down = ItemService::new(Arc::new(DownStore));
        let report = down.health().await;
        assert_eq!(report.status, "ok");
        assert_eq!(report.database, "disconnected");
    }

    #[tokio::test]
    async fn test_storage_failures_are_wrapped() {
        let service = ItemService::new(Arc::new(DownStore));
        assert!(matches!(
            service.list().await,
            Err(ItemError::StorageUnavailable(_))
        ));
        assert!(matches!(
            service.create(ItemInput::new("x", "")).await,
            Err(ItemError::StorageUnavailable(_))
        ));
        // Validation runs before the store is touched.
        assert!(matches!(
            service.create(ItemInput::new("", "")).await,
            Err(ItemError::InvalidInput(_))
        ));
    }
}
