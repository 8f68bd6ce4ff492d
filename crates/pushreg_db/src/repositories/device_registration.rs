//! Repository for device registrations
//!
//! This module provides the storage interface for the device registration table.
//! Every mutation it exposes is a single atomic statement; callers never read
//! a row and then branch on it to decide how to write.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

// Re-export the shared model for convenience
pub use pushreg_common::models::{DeviceRegistration, DeviceType, NewRegistration};

// Timestamps are stored as integer milliseconds since the epoch.
#[derive(Debug, Clone, FromRow)]
pub struct DbDeviceRegistration {
    pub id: i64,
    pub user_id: String,
    pub device_id: String,
    pub push_address: String,
    pub device_type: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn millis_to_datetime(field: &str, millis: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DbError::CorruptRow(format!("{} out of range: {}", field, millis)))
}

impl TryFrom<DbDeviceRegistration> for DeviceRegistration {
    type Error = DbError;

    fn try_from(db: DbDeviceRegistration) -> Result<Self, Self::Error> {
        let device_type = db
            .device_type
            .parse::<DeviceType>()
            .map_err(|e| DbError::CorruptRow(e.to_string()))?;

        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            device_id: db.device_id,
            push_address: db.push_address,
            device_type,
            is_active: db.is_active,
            created_at: millis_to_datetime("created_at", db.created_at)?,
            updated_at: millis_to_datetime("updated_at", db.updated_at)?,
        })
    }
}

/// Result of a deactivation attempt at the storage layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivateOutcome {
    /// An active row was flipped to inactive
    Deactivated,
    /// No row exists for the pair
    NotFound,
    /// The row was already inactive; nothing changed
    AlreadyInactive,
}

/// Repository for device registrations
pub trait DeviceRegistrationRepository {
    /// Initialize the database schema
    ///
    /// Creates the table and its indexes if they don't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Insert or reactivate the registration for `(user_id, device_id)`
    ///
    /// A single atomic upsert: a new pair is inserted active; an existing pair gets
    /// its push address replaced, is forced active and has `updated_at` set to `now`.
    /// `created_at` is never touched on the update path.
    ///
    /// # Returns
    ///
    /// The row as stored after the statement
    fn upsert_registration(
        &self,
        registration: &NewRegistration,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<DeviceRegistration, DbError>> + Send;

    /// Mark the registration for `(user_id, device_id)` inactive
    fn deactivate(
        &self,
        user_id: &str,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<DeactivateOutcome, DbError>> + Send;

    /// Find a device registration by user ID and device ID
    fn find_by_user_and_device(
        &self,
        user_id: &str,
        device_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<DeviceRegistration>, DbError>> + Send;

    /// Find all device registrations for a user, active or not
    fn find_by_user(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<DeviceRegistration>, DbError>> + Send;

    /// Push addresses of every active registration for a user, in no particular order
    fn find_active_push_addresses(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, DbError>> + Send;

    /// Delete inactive registrations last updated strictly before `cutoff`
    ///
    /// # Returns
    ///
    /// The number of rows removed
    fn delete_inactive_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;
}
