use pushreg_common::RegistryError;
use pushreg_db::DbError;
use thiserror::Error;

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
