// Queue Service - Core use cases for stores and their waiting lines

pub mod consumer;
pub mod store;

use crate::domain::{Consumer, Position, Store};
use crate::error::{AppError, Result};
use crate::port::{AccessKeyProvider, QueueRepository, TimeProvider};
use std::sync::Arc;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/mystore";

/// Settings that shape outbound values (URLs)
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Store/consumer service: validates input, then delegates to the repository.
///
/// Validation failures are `AppError::InvalidArgument` and never reach the
/// repository. Repository errors pass through unchanged.
pub struct QueueService {
    repo: Arc<dyn QueueRepository>,
    key_provider: Arc<dyn AccessKeyProvider>,
    time_provider: Arc<dyn TimeProvider>,
    config: ServiceConfig,
}

impl QueueService {
    pub fn new(
        repo: Arc<dyn QueueRepository>,
        key_provider: Arc<dyn AccessKeyProvider>,
        time_provider: Arc<dyn TimeProvider>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            key_provider,
            time_provider,
            config,
        }
    }

    /// Register a new store
    pub async fn create(&self, name: &str) -> Result<Store> {
        store::create(
            self.repo.as_ref(),
            self.time_provider.as_ref(),
            &self.config,
            name,
        )
        .await
    }

    pub async fn remove_store(&self, id: &str) -> Result<()> {
        store::remove(self.repo.as_ref(), id).await
    }

    pub async fn get_all_stores(&self) -> Result<Vec<String>> {
        self.repo.list_store_names().await
    }

    pub async fn get_store(&self, name: &str) -> Result<Store> {
        store::get_by_name(self.repo.as_ref(), name).await
    }

    pub async fn get_store_by_id(&self, id: &str) -> Result<Store> {
        store::get_by_id(self.repo.as_ref(), id).await
    }

    /// Enqueue a consumer and return their ticket URL
    pub async fn add_consumer(
        &self,
        store_id: &str,
        name: &str,
        phone: &str,
        status: &str,
    ) -> Result<String> {
        consumer::add(
            self.repo.as_ref(),
            self.key_provider.as_ref(),
            self.time_provider.as_ref(),
            consumer::AddConsumer {
                store_id,
                name,
                phone,
                status,
            },
        )
        .await
    }

    pub async fn remove_consumer(&self, store_id: &str, phone: &str) -> Result<()> {
        consumer::remove(self.repo.as_ref(), store_id, phone).await
    }

    /// Position is 0-based
    pub async fn get_consumer(&self, store_id: &str, phone: &str) -> Result<(Position, Consumer)> {
        consumer::get(self.repo.as_ref(), store_id, phone).await
    }

    pub async fn get_all_consumers(&self, store_id: &str) -> Result<Vec<Consumer>> {
        consumer::list(self.repo.as_ref(), store_id).await
    }

    /// Credential check used by a consumer polling their place in line
    pub async fn validate_consumer(
        &self,
        store_name: &str,
        access_key: &str,
    ) -> Result<(Position, Consumer)> {
        consumer::validate(self.repo.as_ref(), store_name, access_key).await
    }
}

/// Reject empty required fields
pub(crate) fn require(fields: &[&str], message: &str) -> Result<()> {
    if fields.iter().any(|f| f.is_empty()) {
        return Err(AppError::InvalidArgument(message.to_string()));
    }
    Ok(())
}
