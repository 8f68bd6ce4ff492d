//! Seam to the platform push provider and permission API.

use pushreg_common::DeviceType;
use std::future::Future;
use thiserror::Error;

use crate::error::AgentError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("unsupported environment")]
    UnsupportedEnvironment,
    #[error("{0}")]
    Unavailable(String),
}

impl From<ProviderError> for AgentError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::PermissionDenied => AgentError::PermissionDenied,
            ProviderError::UnsupportedEnvironment => AgentError::UnsupportedEnvironment,
            ProviderError::Unavailable(msg) => AgentError::Provider(msg),
        }
    }
}

/// Platform push provider as seen by the agent.
///
/// Implementations wrap the OS notification APIs. The push address they return
/// is opaque and may rotate between calls.
pub trait PushAddressProvider {
    /// Platform of this install
    fn device_type(&self) -> DeviceType;

    /// Obtain the current push address
    fn acquire_push_address(&self) -> impl Future<Output = Result<String, ProviderError>> + Send;

    fn notifications_enabled(&self) -> impl Future<Output = bool> + Send;

    fn request_permissions(&self) -> impl Future<Output = bool> + Send;
}
