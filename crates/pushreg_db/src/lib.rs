//! Storage layer for the push token registry
//!
//! This crate owns the `device_registrations` table: one row per
//! `(user_id, device_id)` pair, enforced by a uniqueness constraint and written
//! only through atomic statements. It uses SQLx on SQLite; file databases run in
//! WAL mode, `sqlite::memory:` is supported for tests and local runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use pushreg_db::{DbClient, DeviceRegistrationRepository, SqlDeviceRegistrationRepository};
//!
//! async fn setup_db() -> Result<SqlDeviceRegistrationRepository, Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite::memory:").await?;
//!     let repo = SqlDeviceRegistrationRepository::new(db_client);
//!     repo.init_schema().await?;
//!     Ok(repo)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;
pub mod repository;

// Re-export the client and repository traits for ease of use
pub use client::DbClient;
pub use error::DbError;
pub use repository::RepositoryFactory;

// Re-export the repositories module components for ease of use
pub use repositories::{
    DeactivateOutcome, DeviceRegistration, DeviceRegistrationRepository,
    DeviceRegistrationRepositoryFactory, NewRegistration, SqlDeviceRegistrationRepository,
};
