use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    cleanup_tokens_handler, deactivate_device_handler, health_handler, register_device_handler,
    user_tokens_handler, RegistryState,
};
use crate::service::SqlRegistryService;

/// Create the token registry routes
///
/// The router carries its own state, so the backend can merge it into a larger
/// application or serve it directly.
pub fn routes(service: Arc<SqlRegistryService>) -> Router {
    let state = Arc::new(RegistryState { service });

    info!("Token registry routes initialized");

    Router::new()
        .route("/register-device", post(register_device_handler))
        .route("/deactivate-device", post(deactivate_device_handler))
        .route("/user-tokens/{user_id}", get(user_tokens_handler))
        .route("/cleanup-tokens", post(cleanup_tokens_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
