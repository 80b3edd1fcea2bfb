use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KeyValue {
    pub id: i64,
    pub value: String,
    pub language: String,
    pub key_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewKeyValue {
    pub value: String,
    pub language: String,
    pub key_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct KeyValueChanges {
    pub value: Option<String>,
    pub language: Option<String>,
}

impl KeyValue {
    pub fn merge(&mut self, changes: KeyValueChanges) {
        if let Some(value) = changes.value {
            self.value = value;
        }
        if let Some(language) = changes.language {
            self.language = language;
        }
    }
}
