// Waitline Infrastructure - SQLite Adapter
// Implements: QueueRepository

mod connection;
mod migration;
mod queue_repository;

pub use connection::{close_pool, create_pool, PoolSettings};
pub use sqlx::SqlitePool;
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;

// Note: sqlx::Error conversion is handled by a mapping helper in
// queue_repository.rs due to Rust's orphan rules (cannot implement
// From<sqlx::Error> for AppError here)
