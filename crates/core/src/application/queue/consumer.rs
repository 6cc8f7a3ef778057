// Consumer Use Cases

use super::require;
use crate::domain::{Consumer, Position};
use crate::error::Result;
use crate::port::{AccessKeyProvider, QueueRepository, TimeProvider};
use tracing::{debug, info};

/// Enqueue request
#[derive(Debug, Clone, Copy)]
pub struct AddConsumer<'a> {
    pub store_id: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
    pub status: &'a str,
}

/// Append a consumer to a store's line and return the consumer's ticket URL
/// (`store.access_url/access_key`).
pub async fn add(
    repo: &dyn QueueRepository,
    key_provider: &dyn AccessKeyProvider,
    time_provider: &dyn TimeProvider,
    req: AddConsumer<'_>,
) -> Result<String> {
    require(
        &[req.store_id, req.name, req.phone],
        "store id, consumer name and phone required",
    )?;

    // Resolve the store first so a failed lookup leaves nothing enqueued
    let store = repo.get_store_by_id(req.store_id).await?;

    let consumer = Consumer::new(
        req.name,
        req.phone,
        key_provider.generate_key(),
        req.status,
        time_provider.now_millis(),
    );
    let access_key = consumer.access_key.clone();

    repo.add_consumer(req.store_id, consumer).await?;
    info!(store_id = req.store_id, phone = req.phone, "Consumer enqueued");

    Ok(format!("{}/{}", store.access_url, access_key))
}

pub async fn remove(repo: &dyn QueueRepository, store_id: &str, phone: &str) -> Result<()> {
    require(&[store_id, phone], "store id and phone required")?;

    repo.remove_consumer(store_id, phone).await?;
    info!(store_id, phone, "Consumer dequeued");
    Ok(())
}

pub async fn get(
    repo: &dyn QueueRepository,
    store_id: &str,
    phone: &str,
) -> Result<(Position, Consumer)> {
    require(&[store_id, phone], "store id and phone required")?;

    let found = repo.get_consumer(store_id, phone).await;
    if let Err(e) = &found {
        debug!(store_id, phone, error = %e, "Consumer lookup failed");
    }
    found
}

pub async fn list(repo: &dyn QueueRepository, store_id: &str) -> Result<Vec<Consumer>> {
    require(&[store_id], "store id required")?;
    repo.get_all_consumers(store_id).await
}

pub async fn validate(
    repo: &dyn QueueRepository,
    store_name: &str,
    access_key: &str,
) -> Result<(Position, Consumer)> {
    require(&[store_name, access_key], "store name and access key required")?;

    let found = repo.validate_consumer(store_name, access_key).await;
    if let Err(e) = &found {
        debug!(store_name, error = %e, "Access key rejected");
    }
    found
}
