//! Input validation shared by the registry endpoints.
//!
//! Everything here runs before any storage access.

use crate::error::{validation_error, RegistryError};

/// Longest user or device identifier the registry accepts.
pub const MAX_ID_LEN: usize = 255;

/// Longest push address the registry accepts.
pub const MAX_PUSH_ADDRESS_LEN: usize = 4096;

/// Rejects empty and whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        return Err(validation_error(format!("{} is required", field)));
    }
    Ok(())
}

/// Push addresses are opaque, so only presence and length are checked.
pub fn validate_push_address(push_address: &str) -> Result<(), RegistryError> {
    validate_required("push_address", push_address)?;
    if push_address.len() > MAX_PUSH_ADDRESS_LEN {
        return Err(validation_error(format!(
            "push_address must be at most {} bytes",
            MAX_PUSH_ADDRESS_LEN
        )));
    }
    Ok(())
}

/// Validates a key-like identifier: required, bounded, no control characters.
fn validate_key(field: &str, value: &str) -> Result<(), RegistryError> {
    validate_required(field, value)?;
    if value.len() > MAX_ID_LEN {
        return Err(validation_error(format!(
            "{} must be at most {} bytes",
            field, MAX_ID_LEN
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(validation_error(format!(
            "{} must not contain control characters",
            field
        )));
    }
    Ok(())
}

pub fn validate_user_id(user_id: &str) -> Result<(), RegistryError> {
    validate_key("user_id", user_id)
}

pub fn validate_device_id(device_id: &str) -> Result<(), RegistryError> {
    validate_key("device_id", device_id)
}
