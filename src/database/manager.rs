use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::database::{MemoryStore, PgStore, Store};

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DatabaseError::UniqueViolation(constraint);
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds the storage backend selected by configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the configured store. Postgres pools are migrated before use.
    pub async fn open(config: &AppConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        match config.database.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage backend");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let pool = Self::connect(config).await?;
                Self::migrate(&pool).await?;
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Create the Postgres connection pool
    pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .database
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", Self::redact(&parsed));
        Ok(pool)
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Connection string without credentials, for logs
    fn redact(url: &url::Url) -> String {
        let mut url = url.clone();
        let _ = url.set_password(None);
        let _ = url.set_username("");
        url.to_string()
    }
}
