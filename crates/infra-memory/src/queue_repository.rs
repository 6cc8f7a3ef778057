// In-Memory QueueRepository Implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use waitline_core::domain::{position_of, Consumer, NewStore, Position, Store, StoreId};
use waitline_core::error::{AppError, Result};
use waitline_core::port::{IdProvider, QueueRepository};

/// One store's waiting line.
///
/// `closed` is set under the write lock when the store is removed, so a
/// mutation that raced the removal sees NotFound instead of writing into a
/// detached list.
#[derive(Default)]
struct Line {
    consumers: Vec<Consumer>,
    closed: bool,
}

struct StoreEntry {
    store: Store,
    line: RwLock<Line>,
}

#[derive(Default)]
struct Registry {
    by_id: HashMap<StoreId, Arc<StoreEntry>>,
    by_name: HashMap<String, StoreId>,
    // creation order, for list_store_names
    order: Vec<StoreId>,
}

/// Two-level locking: the registry lock is held only to resolve a store,
/// then each store's line has its own lock. Mutations of one store never
/// block another store.
pub struct InMemoryQueueRepository {
    registry: RwLock<Registry>,
    id_provider: Arc<dyn IdProvider>,
}

impl InMemoryQueueRepository {
    pub fn new(id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            id_provider,
        }
    }

    async fn entry_by_id(&self, id: &str) -> Result<Arc<StoreEntry>> {
        self.registry
            .read()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::store_not_found(id))
    }

    async fn entry_by_name(&self, name: &str) -> Result<Arc<StoreEntry>> {
        let registry = self.registry.read().await;
        registry
            .by_name
            .get(name)
            .and_then(|id| registry.by_id.get(id))
            .cloned()
            .ok_or_else(|| AppError::store_not_found(name))
    }
}

#[async_trait]
impl QueueRepository for InMemoryQueueRepository {
    async fn create_store(&self, store: NewStore) -> Result<Store> {
        let mut registry = self.registry.write().await;

        if registry.by_name.contains_key(&store.name) {
            return Err(AppError::AlreadyExists(format!(
                "store with name {} already registered",
                store.name
            )));
        }

        let id = self.id_provider.generate_id();
        if registry.by_id.contains_key(&id) {
            return Err(AppError::Internal(format!("duplicate store id {}", id)));
        }

        let store = store.into_store(id.clone());
        registry.by_name.insert(store.name.clone(), id.clone());
        registry.order.push(id.clone());
        registry.by_id.insert(
            id,
            Arc::new(StoreEntry {
                store: store.clone(),
                line: RwLock::new(Line::default()),
            }),
        );

        Ok(store)
    }

    async fn remove_store(&self, id: &str) -> Result<()> {
        let entry = {
            let mut registry = self.registry.write().await;
            let entry = registry
                .by_id
                .remove(id)
                .ok_or_else(|| AppError::store_not_found(id))?;
            registry.by_name.remove(&entry.store.name);
            registry.order.retain(|s| s != id);
            entry
        };

        let mut line = entry.line.write().await;
        line.closed = true;
        debug!(store_id = id, dropped = line.consumers.len(), "Store line closed");
        line.consumers.clear();
        Ok(())
    }

    async fn get_store(&self, name: &str) -> Result<Store> {
        Ok(self.entry_by_name(name).await?.store.clone())
    }

    async fn get_store_by_id(&self, id: &str) -> Result<Store> {
        Ok(self.entry_by_id(id).await?.store.clone())
    }

    async fn list_store_names(&self) -> Result<Vec<String>> {
        let registry = self.registry.read().await;
        Ok(registry
            .order
            .iter()
            .filter_map(|id| registry.by_id.get(id))
            .map(|e| e.store.name.clone())
            .collect())
    }

    async fn add_consumer(&self, store_id: &str, consumer: Consumer) -> Result<()> {
        let entry = self.entry_by_id(store_id).await?;
        let mut line = entry.line.write().await;

        if line.closed {
            return Err(AppError::store_not_found(store_id));
        }
        if line.consumers.iter().any(|c| c.phone == consumer.phone) {
            return Err(AppError::InvalidArgument(format!(
                "phone {} already in queue of store {}",
                consumer.phone, store_id
            )));
        }

        line.consumers.push(consumer);
        Ok(())
    }

    async fn remove_consumer(&self, store_id: &str, phone: &str) -> Result<()> {
        let entry = self.entry_by_id(store_id).await?;
        let mut line = entry.line.write().await;

        if line.closed {
            return Err(AppError::store_not_found(store_id));
        }
        let idx = line
            .consumers
            .iter()
            .position(|c| c.phone == phone)
            .ok_or_else(|| AppError::consumer_not_found(store_id, phone))?;

        // Vec::remove shifts the tail left, keeping relative order
        line.consumers.remove(idx);
        Ok(())
    }

    async fn get_consumer(&self, store_id: &str, phone: &str) -> Result<(Position, Consumer)> {
        let entry = self.entry_by_id(store_id).await?;
        let line = entry.line.read().await;
        if line.closed {
            return Err(AppError::store_not_found(store_id));
        }

        position_of(&line.consumers, |c| c.phone == phone)
            .map(|(pos, c)| (pos, c.clone()))
            .ok_or_else(|| AppError::consumer_not_found(store_id, phone))
    }

    async fn get_all_consumers(&self, store_id: &str) -> Result<Vec<Consumer>> {
        let entry = self.entry_by_id(store_id).await?;
        let line = entry.line.read().await;
        if line.closed {
            return Err(AppError::store_not_found(store_id));
        }
        Ok(line.consumers.clone())
    }

    async fn validate_consumer(
        &self,
        store_name: &str,
        access_key: &str,
    ) -> Result<(Position, Consumer)> {
        let entry = self.entry_by_name(store_name).await?;
        let line = entry.line.read().await;
        if line.closed {
            return Err(AppError::store_not_found(store_name));
        }

        position_of(&line.consumers, |c| c.access_key == access_key)
            .map(|(pos, c)| (pos, c.clone()))
            .ok_or_else(|| AppError::NotFound(format!("access key not valid for {}", store_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};
    use waitline_core::error::ErrorKind;
    use waitline_core::port::UuidProvider;

    fn repo() -> InMemoryQueueRepository {
        InMemoryQueueRepository::new(Arc::new(UuidProvider))
    }

    fn new_store(name: &str) -> NewStore {
        NewStore {
            name: name.to_string(),
            access_url: format!("http://x/{}", name.to_lowercase()),
            created_at: 0,
        }
    }

    fn consumer(phone: &str, key: &str) -> Consumer {
        Consumer::new(format!("c{}", phone), phone, key, "waiting", 0)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = repo();
        let store = repo.create_store(new_store("Outback")).await.unwrap();

        assert_eq!(repo.get_store("Outback").await.unwrap(), store);
        assert_eq!(repo.get_store_by_id(&store.id).await.unwrap(), store);
        assert!(repo.get_store("outback").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let repo = repo();
        repo.create_store(new_store("Outback")).await.unwrap();

        let err = assert_err!(repo.create_store(new_store("Outback")).await);
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_names_listed_in_creation_order() {
        let repo = repo();
        for name in ["Outback", "Jeronimo", "Abc"] {
            repo.create_store(new_store(name)).await.unwrap();
        }
        let jeronimo = repo.get_store("Jeronimo").await.unwrap();
        repo.remove_store(&jeronimo.id).await.unwrap();

        assert_eq!(repo.list_store_names().await.unwrap(), vec!["Outback", "Abc"]);
    }

    #[tokio::test]
    async fn test_remove_shifts_later_positions() {
        let repo = repo();
        let store = repo.create_store(new_store("Outback")).await.unwrap();
        for phone in ["a", "b", "c"] {
            repo.add_consumer(&store.id, consumer(phone, phone)).await.unwrap();
        }

        assert_eq!(repo.get_consumer(&store.id, "b").await.unwrap().0, 1);
        repo.remove_consumer(&store.id, "a").await.unwrap();
        assert_eq!(repo.get_consumer(&store.id, "b").await.unwrap().0, 0);
        assert_eq!(repo.get_consumer(&store.id, "c").await.unwrap().0, 1);
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_invalid_argument() {
        let repo = repo();
        let store = repo.create_store(new_store("Outback")).await.unwrap();
        repo.add_consumer(&store.id, consumer("a", "1")).await.unwrap();

        let err = repo
            .add_consumer(&store.id, consumer("a", "2"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(repo.get_all_consumers(&store.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validate_picks_earliest_on_key_collision() {
        let repo = repo();
        let store = repo.create_store(new_store("Outback")).await.unwrap();
        repo.add_consumer(&store.id, consumer("a", "1")).await.unwrap();
        repo.add_consumer(&store.id, consumer("b", "7")).await.unwrap();
        repo.add_consumer(&store.id, consumer("c", "7")).await.unwrap();

        let (pos, c) = repo.validate_consumer("Outback", "7").await.unwrap();
        assert_eq!(pos, 1);
        assert_eq!(c.phone, "b");
        assert!(repo
            .validate_consumer("Outback", "8")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(repo
            .validate_consumer("Nowhere", "7")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_removed_store_rejects_consumers() {
        let repo = repo();
        let store = repo.create_store(new_store("Outback")).await.unwrap();
        repo.add_consumer(&store.id, consumer("a", "1")).await.unwrap();
        repo.remove_store(&store.id).await.unwrap();

        assert!(repo.remove_store(&store.id).await.unwrap_err().is_not_found());
        assert!(repo
            .add_consumer(&store.id, consumer("b", "2"))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(repo
            .get_all_consumers(&store.id)
            .await
            .unwrap_err()
            .is_not_found());
        // name is free again
        assert_ok!(repo.create_store(new_store("Outback")).await);
    }
}
