// --- File: crates/pushreg_common/src/error.rs ---
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable error codes carried in every failure response.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    AlreadyInactive,
    ConflictRace,
    StorageError,
    /// Any code this build does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyInactive => "ALREADY_INACTIVE",
            ErrorCode::ConflictRace => "CONFLICT_RACE",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
        };
        f.write_str(code)
    }
}

/// Failures of the token registry.
///
/// `NotFound` and `AlreadyInactive` are distinguishable outcomes of a deactivation,
/// not crashes; callers that only care about the end state treat both as achieved.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Malformed or missing input. Never reaches the storage layer.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The deactivation target does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The deactivation target was already revoked
    #[error("Already inactive: {0}")]
    AlreadyInactive(String),

    /// The storage layer produced a duplicate for a (user, device) pair.
    /// Indicates the uniqueness constraint is not being honoured.
    #[error("Conflict race: {0}")]
    ConflictRace(String),

    /// Transient or persistent backend failure, safe to retry
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl RegistryError {
    /// Returns the wire error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::ValidationError(_) => ErrorCode::ValidationError,
            RegistryError::NotFound(_) => ErrorCode::NotFound,
            RegistryError::AlreadyInactive(_) => ErrorCode::AlreadyInactive,
            RegistryError::ConflictRace(_) => ErrorCode::ConflictRace,
            RegistryError::StorageError(_) => ErrorCode::StorageError,
        }
    }

    /// Whether the caller's desired end state (no live registration) already holds.
    pub fn is_already_achieved(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound(_) | RegistryError::AlreadyInactive(_)
        )
    }
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for RegistryError {
    fn status_code(&self) -> u16 {
        match self {
            RegistryError::ValidationError(_) => 400,
            RegistryError::NotFound(_) => 404,
            RegistryError::AlreadyInactive(_) => 400,
            RegistryError::ConflictRace(_) => 500,
            RegistryError::StorageError(_) => 500,
        }
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> RegistryError {
    RegistryError::ValidationError(message.to_string())
}

pub fn storage_error<T: fmt::Display>(message: T) -> RegistryError {
    RegistryError::StorageError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error("x").status_code(), 400);
        assert_eq!(RegistryError::NotFound("x".into()).status_code(), 404);
        assert_eq!(RegistryError::AlreadyInactive("x".into()).status_code(), 400);
        assert_eq!(storage_error("x").status_code(), 500);
    }

    #[test]
    fn test_error_code_wire_format() {
        let json = serde_json::to_string(&ErrorCode::AlreadyInactive).unwrap();
        assert_eq!(json, "\"ALREADY_INACTIVE\"");
        assert_eq!(ErrorCode::AlreadyInactive.to_string(), "ALREADY_INACTIVE");

        let unknown: ErrorCode = serde_json::from_str("\"RATE_LIMITED\"").unwrap();
        assert_eq!(unknown, ErrorCode::Unknown);
    }

    #[test]
    fn test_already_achieved() {
        assert!(RegistryError::NotFound("x".into()).is_already_achieved());
        assert!(RegistryError::AlreadyInactive("x".into()).is_already_achieved());
        assert!(!storage_error("x").is_already_achieved());
    }
}
