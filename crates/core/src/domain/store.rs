// Store Domain Model

use serde::{Deserialize, Serialize};

/// Store ID (UUID v4)
pub type StoreId = String;

/// A registered business that owns one waiting line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(rename = "accessURL")]
    pub access_url: String,
    pub created_at: i64, // epoch ms
}

/// Store fields known before the repository assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStore {
    pub name: String,
    pub access_url: String,
    pub created_at: i64,
}

impl NewStore {
    pub fn into_store(self, id: StoreId) -> Store {
        Store {
            id,
            name: self.name,
            access_url: self.access_url,
            created_at: self.created_at,
        }
    }
}

/// Public link of a store: `base_url/lowercase(name)`.
pub fn store_access_url(base_url: &str, name: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), name.to_lowercase())
}
