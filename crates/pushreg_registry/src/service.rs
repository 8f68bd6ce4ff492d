//! Token registry service layer.
//!
//! Validates requests, drives the repository and translates storage outcomes
//! into the registry's error taxonomy. Validation always runs before any query.

use chrono::{DateTime, Duration, Utc};
use pushreg_common::validation::{validate_device_id, validate_user_id};
use pushreg_common::{
    storage_error, validation_error, DeactivateDeviceRequest, RegisterDeviceRequest, RegistryError,
};
use pushreg_config::{RetentionConfig, MAX_RETENTION_DAYS};
use pushreg_db::{
    DbClient, DeactivateOutcome, DeviceRegistrationRepository, DeviceRegistrationRepositoryFactory,
    RepositoryFactory, SqlDeviceRegistrationRepository,
};
use tracing::{debug, error, info, warn};

/// The service as wired by the backend: backed by SQLite.
pub type SqlRegistryService = TokenRegistryService<SqlDeviceRegistrationRepository>;

/// Authoritative register/deactivate/list/cleanup surface over device registrations.
#[derive(Debug, Clone)]
pub struct TokenRegistryService<R> {
    repository: R,
    retention: Duration,
}

impl SqlRegistryService {
    /// Builds the SQL-backed service and makes sure the schema exists.
    pub async fn from_db_client(
        db_client: DbClient,
        retention: &RetentionConfig,
    ) -> Result<Self, RegistryError> {
        let repository = DeviceRegistrationRepositoryFactory::new().create_repository(db_client);
        repository.init_schema().await?;
        Self::new(repository, retention.retention_days)
    }
}

impl<R: DeviceRegistrationRepository> TokenRegistryService<R> {
    /// Fails when `retention_days` is outside `1..=MAX_RETENTION_DAYS`.
    pub fn new(repository: R, retention_days: i64) -> Result<Self, RegistryError> {
        if !(1..=MAX_RETENTION_DAYS).contains(&retention_days) {
            error!("Rejecting retention window of {} days", retention_days);
            return Err(validation_error(format!(
                "retention_days must be between 1 and {}, got {}",
                MAX_RETENTION_DAYS, retention_days
            )));
        }
        let retention = Duration::try_days(retention_days).ok_or_else(|| {
            validation_error(format!("retention_days {} is out of range", retention_days))
        })?;
        Ok(Self {
            repository,
            retention,
        })
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Registers or reactivates a device.
    ///
    /// Created and reactivated rows are not distinguished: both return the row id.
    pub async fn register(&self, request: &RegisterDeviceRequest) -> Result<i64, RegistryError> {
        let registration = request.validate()?;
        debug!(
            "Registering device {} ({}) for user {}",
            registration.device_id, registration.device_type, registration.user_id
        );

        let stored = self
            .repository
            .upsert_registration(&registration, Utc::now())
            .await
            .map_err(|e| {
                let err = RegistryError::from(e);
                if matches!(err, RegistryError::ConflictRace(_)) {
                    error!(
                        "Duplicate registration detected for user {} and device {}: {}",
                        registration.user_id, registration.device_id, err
                    );
                }
                err
            })?;

        info!(
            "Registration {} active for user {} on device {}",
            stored.id, stored.user_id, stored.device_id
        );
        Ok(stored.id)
    }

    /// Soft-revokes a device.
    ///
    /// `NotFound` and `AlreadyInactive` come back as errors so callers can tell them
    /// apart; neither changes any row.
    pub async fn deactivate(&self, request: &DeactivateDeviceRequest) -> Result<(), RegistryError> {
        validate_user_id(&request.user_id)?;
        validate_device_id(&request.device_id)?;

        let outcome = self
            .repository
            .deactivate(&request.user_id, &request.device_id, Utc::now())
            .await?;

        match outcome {
            DeactivateOutcome::Deactivated => {
                info!(
                    "Deactivated device {} for user {}",
                    request.device_id, request.user_id
                );
                Ok(())
            }
            DeactivateOutcome::NotFound => {
                warn!(
                    "No registration to deactivate for user {} and device {}",
                    request.user_id, request.device_id
                );
                Err(RegistryError::NotFound(format!(
                    "no registration for user '{}' and device '{}'",
                    request.user_id, request.device_id
                )))
            }
            DeactivateOutcome::AlreadyInactive => {
                warn!(
                    "Registration for user {} and device {} is already inactive",
                    request.user_id, request.device_id
                );
                Err(RegistryError::AlreadyInactive(format!(
                    "registration for user '{}' and device '{}' is already inactive",
                    request.user_id, request.device_id
                )))
            }
        }
    }

    /// Push addresses of every active registration of a user.
    pub async fn list_active_tokens(&self, user_id: &str) -> Result<Vec<String>, RegistryError> {
        validate_user_id(user_id)?;
        let tokens = self.repository.find_active_push_addresses(user_id).await?;
        debug!("User {} has {} active push addresses", user_id, tokens.len());
        Ok(tokens)
    }

    /// Deletes registrations inactive for longer than the retention window.
    pub async fn cleanup(&self) -> Result<u64, RegistryError> {
        self.cleanup_at(Utc::now()).await
    }

    /// Same as [`cleanup`](Self::cleanup) with an explicit clock.
    pub async fn cleanup_at(&self, now: DateTime<Utc>) -> Result<u64, RegistryError> {
        let cutoff = now.checked_sub_signed(self.retention).ok_or_else(|| {
            storage_error(format!("retention cutoff before {} is out of range", now))
        })?;
        let deleted = self.repository.delete_inactive_before(cutoff).await?;
        info!(
            "Removed {} registrations inactive since before {}",
            deleted, cutoff
        );
        Ok(deleted)
    }
}
