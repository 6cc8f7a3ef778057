// Port Layer - Interfaces for external dependencies

pub mod access_key_provider;
pub mod id_provider; // For deterministic testing
pub mod queue_repository;
pub mod time_provider;

// Re-exports
pub use access_key_provider::{AccessKeyProvider, RandomAccessKeyProvider};
pub use id_provider::{IdProvider, UuidProvider};
pub use queue_repository::QueueRepository;
pub use time_provider::{SystemTimeProvider, TimeProvider};

#[cfg(test)]
pub use queue_repository::MockQueueRepository;
