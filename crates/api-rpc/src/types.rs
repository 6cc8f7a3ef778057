//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};
use waitline_core::domain::{Consumer, Position, DEFAULT_STATUS};

/// store.create.v1
#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
}

/// store.remove.v1 / store.get_by_id.v1 / consumer.list.v1
#[derive(Debug, Deserialize)]
pub struct StoreIdRequest {
    pub store_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveStoreResponse {
    pub store_id: String,
    pub removed: bool,
}

/// store.list.v1 (no params)
#[derive(Debug, Clone, Serialize)]
pub struct ListStoresResponse {
    pub names: Vec<String>,
}

/// store.get.v1
#[derive(Debug, Deserialize)]
pub struct GetStoreRequest {
    pub name: String,
}

/// consumer.add.v1
#[derive(Debug, Deserialize)]
pub struct AddConsumerRequest {
    pub store_id: String,
    pub name: String,
    pub phone: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct AddConsumerResponse {
    pub access_url: String,
}

/// consumer.remove.v1 / consumer.get.v1
#[derive(Debug, Deserialize)]
pub struct ConsumerRequest {
    pub store_id: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveConsumerResponse {
    pub phone: String,
    pub removed: bool,
}

/// consumer.validate.v1
#[derive(Debug, Deserialize)]
pub struct ValidateConsumerRequest {
    pub store_name: String,
    pub access_key: String,
}

/// Result of consumer.get.v1 and consumer.validate.v1 (position is 0-based)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResponse {
    pub position: Position,
    pub name: String,
    pub phone: String,
    pub access_key: String,
    pub status: String,
}

impl From<(Position, Consumer)> for PositionResponse {
    fn from((position, consumer): (Position, Consumer)) -> Self {
        Self {
            position,
            name: consumer.name,
            phone: consumer.phone,
            access_key: consumer.access_key,
            status: consumer.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListConsumersResponse {
    pub consumers: Vec<Consumer>,
}
