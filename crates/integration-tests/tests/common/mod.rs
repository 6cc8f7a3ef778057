//! Service wiring shared by the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use waitline_core::application::{QueueService, ServiceConfig};
use waitline_core::port::{RandomAccessKeyProvider, SystemTimeProvider, UuidProvider};
use waitline_infra_memory::InMemoryQueueRepository;
use waitline_infra_sqlite::{create_pool, run_migrations, PoolSettings, SqliteQueueRepository};

pub const BASE_URL: &str = "http://app.filas.com";

pub fn memory_service() -> QueueService {
    QueueService::new(
        Arc::new(InMemoryQueueRepository::new(Arc::new(UuidProvider))),
        Arc::new(RandomAccessKeyProvider::new()),
        Arc::new(SystemTimeProvider),
        ServiceConfig {
            base_url: BASE_URL.to_string(),
        },
    )
}

pub async fn sqlite_service() -> QueueService {
    let pool = create_pool("sqlite::memory:", &PoolSettings::default())
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();

    QueueService::new(
        Arc::new(SqliteQueueRepository::new(pool, Arc::new(UuidProvider))),
        Arc::new(RandomAccessKeyProvider::new()),
        Arc::new(SystemTimeProvider),
        ServiceConfig {
            base_url: BASE_URL.to_string(),
        },
    )
}

/// SQLite in a file under `dir`, with a multi-connection WAL pool
pub async fn sqlite_file_service(dir: &TempDir) -> QueueService {
    let url = format!("sqlite://{}", dir.path().join("waitline.db").display());
    let pool = create_pool(&url, &PoolSettings::default()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    QueueService::new(
        Arc::new(SqliteQueueRepository::new(pool, Arc::new(UuidProvider))),
        Arc::new(RandomAccessKeyProvider::new()),
        Arc::new(SystemTimeProvider),
        ServiceConfig {
            base_url: BASE_URL.to_string(),
        },
    )
}

/// Key part of a ticket URL
pub fn key_of(ticket: &str) -> &str {
    ticket.rsplit('/').next().unwrap()
}
