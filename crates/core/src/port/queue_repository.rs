// Queue Repository Port (Interface)

use crate::domain::{Consumer, NewStore, Position, Store};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for stores and their ordered consumer lists.
///
/// Implementations must keep each store's consumers in enqueue order and
/// compute positions against a consistent snapshot of that order. Every
/// lookup miss is `AppError::NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Register a store, assigning it a fresh id (AlreadyExists on name clash)
    async fn create_store(&self, store: NewStore) -> Result<Store>;

    /// Delete a store together with its consumer list
    async fn remove_store(&self, id: &str) -> Result<()>;

    /// Find store by exact name
    async fn get_store(&self, name: &str) -> Result<Store>;

    /// Find store by id
    async fn get_store_by_id(&self, id: &str) -> Result<Store>;

    /// All store names, in creation order
    async fn list_store_names(&self) -> Result<Vec<String>>;

    /// Append a pre-populated consumer to the end of a store's line
    async fn add_consumer(&self, store_id: &str, consumer: Consumer) -> Result<()>;

    /// Remove the consumer with `phone`; later consumers move up by one
    async fn remove_consumer(&self, store_id: &str, phone: &str) -> Result<()>;

    /// Locate a consumer by phone (0-based position)
    async fn get_consumer(&self, store_id: &str, phone: &str) -> Result<(Position, Consumer)>;

    /// Snapshot of the whole line in enqueue order
    async fn get_all_consumers(&self, store_id: &str) -> Result<Vec<Consumer>>;

    /// Resolve store by name, then consumer by access key (earliest match wins)
    async fn validate_consumer(
        &self,
        store_name: &str,
        access_key: &str,
    ) -> Result<(Position, Consumer)>;
}
