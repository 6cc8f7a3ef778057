// Consumer Domain Model

use serde::{Deserialize, Serialize};

/// Phone number; unique key of a consumer inside one store's queue
pub type Phone = String;

/// Opaque numeric token handed to a consumer at enqueue time
pub type AccessKey = String;

/// 0-based rank within a store's current ordered list
pub type Position = usize;

/// Status label used when the caller does not supply one
pub const DEFAULT_STATUS: &str = "waiting";

/// A person waiting in a store's line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumer {
    pub name: String,
    pub phone: Phone,
    pub access_key: AccessKey,
    pub status: String,
    pub enqueued_at: i64, // epoch ms
}

impl Consumer {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        access_key: impl Into<String>,
        status: impl Into<String>,
        enqueued_at: i64,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            access_key: access_key.into(),
            status: status.into(),
            enqueued_at,
        }
    }
}

/// Locate `pred` in an enqueue-ordered list and return its rank.
pub fn position_of<'a, F>(consumers: &'a [Consumer], pred: F) -> Option<(Position, &'a Consumer)>
where
    F: Fn(&Consumer) -> bool,
{
    consumers.iter().enumerate().find(|(_, c)| pred(c))
}
