use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors raised by the document store and repositories
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique index rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                let key = db.constraint().unwrap_or("unique key").to_string();
                DatabaseError::Conflict(key)
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

impl From<crate::filter::FilterError> for DatabaseError {
    fn from(err: crate::filter::FilterError) -> Self {
        DatabaseError::QueryError(err.to_string())
    }
}

/// Owns the process-wide connection pool.
///
/// Created once at startup, handed to the document store, and closed after
/// the server finishes draining.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Connecting to database {}", redact_url(&config.url));

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Database pool ready (max_connections={})", config.max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

/// Strip the password from a connection string before it reaches the logs.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<invalid database url>".to_string(),
    }
}
