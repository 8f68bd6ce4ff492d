//! Token registry service
//!
//! This crate is the authoritative store-facing side of push notification
//! registration. It keeps at most one registration per `(user_id, device_id)`,
//! reactivates in place, soft-revokes on deactivate and leaves hard deletion to
//! the [`RetentionSweeper`](sweeper::RetentionSweeper).
//!
//! # Example
//!
//! ```rust,no_run
//! use pushreg_config::RetentionConfig;
//! use pushreg_db::DbClient;
//! use pushreg_registry::{routes, SqlRegistryService};
//! use std::sync::Arc;
//!
//! async fn setup_app() -> Result<axum::Router, Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite::memory:").await?;
//!     let service =
//!         SqlRegistryService::from_db_client(db_client, &RetentionConfig::default()).await?;
//!     Ok(routes(Arc::new(service)))
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /register-device` - Register or reactivate a device
//! - `POST /deactivate-device` - Soft-revoke a device
//! - `GET /user-tokens/{user_id}` - Active push addresses of a user
//! - `POST /cleanup-tokens` - Run the retention sweep now
//! - `GET /health` - Liveness probe

#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod sweeper;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
pub use service::{SqlRegistryService, TokenRegistryService};
pub use sweeper::RetentionSweeper;

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::RegistryApiDoc;
}
