// --- File: crates/pushreg_common/src/http.rs ---
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{validation_error, HttpStatusCode, RegistryError};
use crate::models::ErrorResponse;

// Include the client module
pub mod client;

/// Extension trait for RegistryError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for RegistryError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(ErrorResponse {
            success: false,
            error: self.code(),
            message: self.to_string(),
        });

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for RegistryError to make it easier to use in Axum handlers.
impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Malformed JSON bodies are validation failures, rendered in the common envelope.
impl From<JsonRejection> for RegistryError {
    fn from(rejection: JsonRejection) -> Self {
        validation_error(rejection.body_text())
    }
}
