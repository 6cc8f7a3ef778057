// Domain Layer - Pure business logic and entities

pub mod consumer;
pub mod store;

// Re-exports
pub use consumer::{position_of, AccessKey, Consumer, Phone, Position, DEFAULT_STATUS};
pub use store::{store_access_url, NewStore, Store, StoreId};
