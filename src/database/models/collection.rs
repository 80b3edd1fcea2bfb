use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub created_by_user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCollection {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub created_by_user_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl Collection {
    pub fn merge(&mut self, changes: CollectionChanges) {
        if let Some(code) = changes.code {
            self.code = code;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
    }
}
