// --- File: crates/pushreg_common/src/lib.rs ---

// Declare modules within this crate
pub mod models;     // Registration row and wire types
pub mod validation; // Input validation
pub mod error;      // Error taxonomy
pub mod http;       // HTTP utilities
pub mod logging;    // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{storage_error, validation_error, ErrorCode, HttpStatusCode, RegistryError};

// Re-export HTTP utilities for easier access
pub use http::{client::create_client, IntoHttpResponse};

// Re-export the shared data model
pub use models::{
    CleanupTokensResponse, DeactivateDeviceRequest, DeactivateDeviceResponse, DeviceRegistration,
    DeviceType, ErrorResponse, HealthResponse, NewRegistration, RegisterDeviceRequest,
    RegisterDeviceResponse, UserTokensResponse,
};

// This crate provides the functionality shared by the registry service and the
// registration agent: the data model, validation, error handling and logging.
