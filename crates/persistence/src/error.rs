//! Error types for persistence bootstrap and transaction handling.

use thiserror::Error;

/// Errors surfaced while assembling the persistence layer or beginning a
/// transaction. Bootstrap variants are fatal at startup.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Invalid connection source: pool is closed")]
    InvalidConnectionSource,

    #[error("Missing required configuration: {0}")]
    MissingConfiguration(String),

    #[error("Unsupported second-level cache provider: {0}")]
    UnsupportedCacheProvider(String),

    #[error("Invalid cache configuration: {0}")]
    CacheConfiguration(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
