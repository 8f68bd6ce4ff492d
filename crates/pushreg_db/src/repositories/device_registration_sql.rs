//! SQL implementation of the device registration repository
//!
//! This module provides a SQLite implementation of the DeviceRegistrationRepository trait.

use crate::error::DbError;
use crate::repositories::device_registration::{
    DbDeviceRegistration, DeactivateOutcome, DeviceRegistration, DeviceRegistrationRepository,
    NewRegistration,
};
use crate::DbClient;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

/// Bound on update-then-read rounds when a register races a deactivate.
const MAX_DEACTIVATE_ATTEMPTS: usize = 5;

const SELECT_COLUMNS: &str =
    "id, user_id, device_id, push_address, device_type, is_active, created_at, updated_at";

/// SQL implementation of the device registration repository
#[derive(Debug, Clone)]
pub struct SqlDeviceRegistrationRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlDeviceRegistrationRepository {
    /// Create a new SQL device registration repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn map_query_error(context: &str, e: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            error!("{}: uniqueness constraint fired: {}", context, db_err);
            return DbError::UniqueViolation(db_err.to_string());
        }
    }
    error!("{}: {}", context, e);
    DbError::QueryError(e.to_string())
}

impl DeviceRegistrationRepository for SqlDeviceRegistrationRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing device registration schema");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS device_registrations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                device_id TEXT NOT NULL,
                push_address TEXT NOT NULL,
                device_type TEXT NOT NULL CHECK (device_type IN ('ios', 'android', 'web')),
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(user_id, device_id)
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_device_registrations_user ON device_registrations (user_id)",
            "CREATE INDEX IF NOT EXISTS idx_device_registrations_sweep ON device_registrations (is_active, updated_at)",
        ];

        for statement in statements {
            self.db_client.execute(statement).await?;
        }

        info!("Device registration schema initialized successfully");
        Ok(())
    }

    async fn upsert_registration(
        &self,
        registration: &NewRegistration,
        now: DateTime<Utc>,
    ) -> Result<DeviceRegistration, DbError> {
        debug!(
            "Upserting registration for user: {} and device: {}",
            registration.user_id, registration.device_id
        );

        let query = format!(
            r#"
            INSERT INTO device_registrations
                (user_id, device_id, push_address, device_type, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            ON CONFLICT(user_id, device_id) DO UPDATE SET
                push_address = excluded.push_address,
                is_active = 1,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let row = sqlx::query_as::<_, DbDeviceRegistration>(&query)
            .bind(&registration.user_id)
            .bind(&registration.device_id)
            .bind(&registration.push_address)
            .bind(registration.device_type.as_str())
            .bind(now.timestamp_millis())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| map_query_error("Failed to upsert device registration", e))?;

        let stored = DeviceRegistration::try_from(row)?;
        info!(
            "Device registration {} stored for user: {}",
            stored.id, stored.user_id
        );
        Ok(stored)
    }

    async fn deactivate(
        &self,
        user_id: &str,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<DeactivateOutcome, DbError> {
        debug!(
            "Deactivating registration for user: {} and device: {}",
            user_id, device_id
        );

        for attempt in 1..=MAX_DEACTIVATE_ATTEMPTS {
            let result = sqlx::query(
                r#"
                UPDATE device_registrations
                SET is_active = 0, updated_at = ?1
                WHERE user_id = ?2 AND device_id = ?3 AND is_active = 1
                "#,
            )
            .bind(now.timestamp_millis())
            .bind(user_id)
            .bind(device_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| map_query_error("Failed to deactivate device registration", e))?;

            if result.rows_affected() > 0 {
                return Ok(DeactivateOutcome::Deactivated);
            }

            // Nothing flipped: tell "never registered" apart from "already revoked".
            // An active row here was (re)registered after the update ran; go again.
            match self.find_by_user_and_device(user_id, device_id).await? {
                None => return Ok(DeactivateOutcome::NotFound),
                Some(row) if !row.is_active => return Ok(DeactivateOutcome::AlreadyInactive),
                Some(_) => debug!(
                    "Registration for user: {} and device: {} reactivated concurrently (attempt {})",
                    user_id, device_id, attempt
                ),
            }
        }

        error!(
            "Giving up deactivating user: {} and device: {} under concurrent registrations",
            user_id, device_id
        );
        Err(DbError::QueryError(format!(
            "registration for user '{}' and device '{}' kept being reactivated",
            user_id, device_id
        )))
    }

    async fn find_by_user_and_device(
        &self,
        user_id: &str,
        device_id: &str,
    ) -> Result<Option<DeviceRegistration>, DbError> {
        debug!(
            "Finding device registration for user: {} and device: {}",
            user_id, device_id
        );

        let query = format!(
            "SELECT {} FROM device_registrations WHERE user_id = ?1 AND device_id = ?2",
            SELECT_COLUMNS
        );

        let row = sqlx::query_as::<_, DbDeviceRegistration>(&query)
            .bind(user_id)
            .bind(device_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| map_query_error("Failed to find device registration", e))?;

        row.map(DeviceRegistration::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<DeviceRegistration>, DbError> {
        debug!("Finding all device registrations for user: {}", user_id);

        let query = format!(
            "SELECT {} FROM device_registrations WHERE user_id = ?1",
            SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<_, DbDeviceRegistration>(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| map_query_error("Failed to find device registrations", e))?;

        rows.into_iter().map(DeviceRegistration::try_from).collect()
    }

    async fn find_active_push_addresses(&self, user_id: &str) -> Result<Vec<String>, DbError> {
        debug!("Finding active push addresses for user: {}", user_id);

        sqlx::query_scalar::<_, String>(
            "SELECT push_address FROM device_registrations WHERE user_id = ?1 AND is_active = 1",
        )
        .bind(user_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| map_query_error("Failed to find active push addresses", e))
    }

    async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        debug!("Deleting inactive registrations last updated before {}", cutoff);

        let result = sqlx::query(
            "DELETE FROM device_registrations WHERE is_active = 0 AND updated_at < ?1",
        )
        .bind(cutoff.timestamp_millis())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| map_query_error("Failed to delete inactive registrations", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::device_registration::DeviceType;
    use chrono::Duration;

    async fn test_repo() -> SqlDeviceRegistrationRepository {
        let client = DbClient::from_url("sqlite::memory:").await.unwrap();
        let repo = SqlDeviceRegistrationRepository::new(client);
        repo.init_schema().await.unwrap();
        repo
    }

    fn registration(user_id: &str, device_id: &str, push_address: &str) -> NewRegistration {
        NewRegistration {
            user_id: user_id.to_string(),
            device_id: device_id.to_string(),
            push_address: push_address.to_string(),
            device_type: DeviceType::Ios,
        }
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let repo = test_repo().await;
        repo.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_upsert_inserts_active_row() {
        let repo = test_repo().await;
        let now = Utc::now();

        let stored = repo
            .upsert_registration(&registration("u1", "dev-1", "addr-a"), now)
            .await
            .unwrap();

        assert!(stored.is_active);
        assert_eq!(stored.push_address, "addr-a");
        assert_eq!(stored.device_type, DeviceType::Ios);
        assert_eq!(stored.created_at, stored.updated_at);
        assert_eq!(stored.created_at.timestamp_millis(), now.timestamp_millis());
    }

    #[tokio::test]
    async fn test_upsert_reactivates_in_place() {
        let repo = test_repo().await;
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(5);
        let t2 = t0 + Duration::seconds(10);

        let first = repo
            .upsert_registration(&registration("u1", "dev-1", "addr-a"), t0)
            .await
            .unwrap();
        assert_eq!(
            repo.deactivate("u1", "dev-1", t1).await.unwrap(),
            DeactivateOutcome::Deactivated
        );

        let second = repo
            .upsert_registration(&registration("u1", "dev-1", "addr-b"), t2)
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert!(second.is_active);
        assert_eq!(second.push_address, "addr-b");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(repo.find_by_user("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_outcomes() {
        let repo = test_repo().await;
        let now = Utc::now();

        assert_eq!(
            repo.deactivate("u1", "dev-1", now).await.unwrap(),
            DeactivateOutcome::NotFound
        );
        assert!(repo.find_by_user("u1").await.unwrap().is_empty());

        repo.upsert_registration(&registration("u1", "dev-1", "addr-a"), now)
            .await
            .unwrap();
        assert_eq!(
            repo.deactivate("u1", "dev-1", now).await.unwrap(),
            DeactivateOutcome::Deactivated
        );
        assert_eq!(
            repo.deactivate("u1", "dev-1", now).await.unwrap(),
            DeactivateOutcome::AlreadyInactive
        );

        let row = repo
            .find_by_user_and_device("u1", "dev-1")
            .await
            .unwrap()
            .unwrap();
        assert!(!row.is_active);
    }

    #[tokio::test]
    async fn test_active_addresses_exclude_inactive_rows() {
        let repo = test_repo().await;
        let now = Utc::now();

        repo.upsert_registration(&registration("u1", "dev-1", "addr-a"), now)
            .await
            .unwrap();
        repo.upsert_registration(&registration("u1", "dev-2", "addr-b"), now)
            .await
            .unwrap();
        repo.upsert_registration(&registration("u2", "dev-3", "addr-c"), now)
            .await
            .unwrap();
        repo.deactivate("u1", "dev-1", now).await.unwrap();

        let addresses = repo.find_active_push_addresses("u1").await.unwrap();
        assert_eq!(addresses, vec!["addr-b".to_string()]);
        assert!(repo
            .find_active_push_addresses("nobody")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_inactive_before_only_removes_old_inactive_rows() {
        let repo = test_repo().await;
        let now = Utc::now();
        let old = now - Duration::days(40);
        let cutoff = now - Duration::days(30);

        // old and inactive: removed
        repo.upsert_registration(&registration("u1", "old-inactive", "a"), old)
            .await
            .unwrap();
        repo.deactivate("u1", "old-inactive", old).await.unwrap();
        // old but active: kept
        repo.upsert_registration(&registration("u1", "old-active", "b"), old)
            .await
            .unwrap();
        // inactive but young: kept
        repo.upsert_registration(&registration("u1", "young-inactive", "c"), old)
            .await
            .unwrap();
        repo.deactivate("u1", "young-inactive", now).await.unwrap();

        assert_eq!(repo.delete_inactive_before(cutoff).await.unwrap(), 1);

        let mut remaining: Vec<String> = repo
            .find_by_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.device_id)
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["old-active", "young-inactive"]);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("registry.db").display());
        let repo = SqlDeviceRegistrationRepository::new(DbClient::from_url(&url).await.unwrap());
        repo.init_schema().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.upsert_registration(
                    &registration("u1", "dev-1", &format!("addr-{}", i)),
                    Utc::now(),
                )
                .await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.dedup();

        assert_eq!(ids.len(), 1);
        let rows = repo.find_by_user("u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_active);
    }

    #[tokio::test]
    async fn test_deactivate_racing_register_never_reports_already_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("registry.db").display());
        let repo = SqlDeviceRegistrationRepository::new(DbClient::from_url(&url).await.unwrap());
        repo.init_schema().await.unwrap();

        for i in 0..50 {
            let device_id = format!("dev-{}", i);

            let register = {
                let repo = repo.clone();
                let device_id = device_id.clone();
                tokio::spawn(async move {
                    repo.upsert_registration(&registration("u1", &device_id, "addr-a"), Utc::now())
                        .await
                })
            };
            let deactivate = {
                let repo = repo.clone();
                let device_id = device_id.clone();
                tokio::spawn(async move { repo.deactivate("u1", &device_id, Utc::now()).await })
            };

            register.await.unwrap().unwrap();
            let outcome = deactivate.await.unwrap().unwrap();
            let row = repo
                .find_by_user_and_device("u1", &device_id)
                .await
                .unwrap()
                .unwrap();

            // No row is ever deactivated before this call, so "already inactive"
            // can only come from misreading a freshly registered row.
            match outcome {
                DeactivateOutcome::Deactivated => assert!(!row.is_active),
                DeactivateOutcome::NotFound => assert!(row.is_active),
                DeactivateOutcome::AlreadyInactive => {
                    panic!("already inactive reported for {}", device_id)
                }
            }
        }
    }
}
