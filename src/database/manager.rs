use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::SharedStore;

/// Errors from the document store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Unsupported database scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Document is not a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which store implementation a connection string selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

impl Backend {
    pub fn from_url(database_url: &str) -> Result<Self, DatabaseError> {
        let url = url::Url::parse(database_url)
            .map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;

        match url.scheme() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            other => Err(DatabaseError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Open the store named by the configured URL and prepare its schema.
pub async fn connect(config: &DatabaseConfig) -> Result<SharedStore, DatabaseError> {
    match Backend::from_url(&config.url)? {
        Backend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.connection_timeout))
                .connect(&config.url)
                .await?;

            let store = PgStore::new(pool);
            store.migrate().await?;

            info!("Connected to PostgreSQL document store at {}", redact(&config.url));
            Ok(Arc::new(store))
        }
        Backend::Memory => {
            info!("Using in-memory document store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Strip credentials from a connection string before it is logged.
fn redact(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.into()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}
