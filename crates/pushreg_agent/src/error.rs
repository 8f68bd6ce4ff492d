//! Error types for the registration agent

use pushreg_common::ErrorCode;
use thiserror::Error;

/// Errors the agent reports to its host application.
///
/// None of these should block a login or logout flow; the agent's boolean
/// entry points log them and return `false`.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The user has not granted notification permission
    #[error("Notification permission denied")]
    PermissionDenied,

    /// Push is unavailable here, for example on an emulator
    #[error("Push notifications are not supported in this environment")]
    UnsupportedEnvironment,

    /// Any other push provider failure
    #[error("Push provider error: {0}")]
    Provider(String),

    /// `register_device` was called before a device id was resolved
    #[error("Device identity has not been resolved")]
    MissingIdentity,

    /// `register_device` was called before a push address was acquired
    #[error("No push address has been acquired")]
    MissingPushAddress,

    /// Local persistence failed
    #[error("Local storage error: {0}")]
    Storage(String),

    /// Transport failure talking to the registry
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with its error envelope
    #[error("Registry rejected the request ({status} {code}): {message}")]
    Registry {
        status: u16,
        code: ErrorCode,
        message: String,
    },

    /// Invalid agent configuration
    #[error("Agent configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Whether a deactivation failure means the device is already unregistered.
    pub fn is_already_achieved(&self) -> bool {
        matches!(
            self,
            AgentError::Registry {
                code: ErrorCode::NotFound | ErrorCode::AlreadyInactive,
                ..
            }
        )
    }
}
