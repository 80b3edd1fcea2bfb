use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A translatable key. Per-language text lives in `key_values`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Key {
    pub id: i64,
    pub key: String,
    pub collection_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewKey {
    pub key: String,
    pub collection_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct KeyChanges {
    pub key: Option<String>,
}

impl Key {
    pub fn merge(&mut self, changes: KeyChanges) {
        if let Some(key) = changes.key {
            self.key = key;
        }
    }
}
