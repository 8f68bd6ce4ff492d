//! Error types for the database client

use pushreg_common::RegistryError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A uniqueness constraint fired where an atomic upsert was expected
    #[error("Uniqueness violation: {0}")]
    UniqueViolation(String),

    /// A stored row could not be mapped back into the model
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl From<DbError> for RegistryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => RegistryError::ConflictRace(msg),
            other => RegistryError::StorageError(other.to_string()),
        }
    }
}
