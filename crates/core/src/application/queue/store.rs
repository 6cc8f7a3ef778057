// Store Use Cases

use super::{require, ServiceConfig};
use crate::domain::{store_access_url, NewStore, Store};
use crate::error::{AppError, ErrorKind, Result};
use crate::port::{QueueRepository, TimeProvider};
use tracing::{debug, info};

/// Register a store under a unique name.
///
/// Looks the name up first and only creates when absent. The repository
/// enforces the same rule, which covers two concurrent creates racing past
/// the lookup.
pub async fn create(
    repo: &dyn QueueRepository,
    time_provider: &dyn TimeProvider,
    config: &ServiceConfig,
    name: &str,
) -> Result<Store> {
    require(&[name], "store name required")?;

    match repo.get_store(name).await {
        Ok(existing) => {
            debug!(store_id = %existing.id, name, "Store name already registered");
            return Err(AppError::AlreadyExists(format!(
                "store with name {} already registered",
                name
            )));
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let new_store = NewStore {
        name: name.to_string(),
        access_url: store_access_url(&config.base_url, name),
        created_at: time_provider.now_millis(),
    };

    let store = repo.create_store(new_store).await?;
    info!(store_id = %store.id, name = %store.name, "Store created");
    Ok(store)
}

pub async fn remove(repo: &dyn QueueRepository, id: &str) -> Result<()> {
    require(&[id], "store id required")?;

    repo.remove_store(id).await?;
    info!(store_id = id, "Store removed");
    Ok(())
}

pub async fn get_by_name(repo: &dyn QueueRepository, name: &str) -> Result<Store> {
    require(&[name], "store name required")?;
    repo.get_store(name).await
}

pub async fn get_by_id(repo: &dyn QueueRepository, id: &str) -> Result<Store> {
    require(&[id], "store id required")?;
    repo.get_store_by_id(id).await
}
