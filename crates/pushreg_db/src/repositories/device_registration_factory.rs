//! Factory for creating device registration repositories
//!
//! The service layer builds its repository through this factory so that the
//! storage implementation is chosen in one place.

use crate::repositories::device_registration_sql::SqlDeviceRegistrationRepository;
use crate::{DbClient, RepositoryFactory};

/// Factory for creating device registration repositories
///
/// This factory provides methods for creating device registration repositories
/// using different database clients.
#[derive(Debug, Clone)]
pub struct DeviceRegistrationRepositoryFactory;

impl DeviceRegistrationRepositoryFactory {
    /// Create a new device registration repository factory
    ///
    /// # Returns
    ///
    /// A new device registration repository factory
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeviceRegistrationRepositoryFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryFactory<SqlDeviceRegistrationRepository, DbClient>
    for DeviceRegistrationRepositoryFactory
{
    fn create_repository(&self, db_client: DbClient) -> SqlDeviceRegistrationRepository {
        SqlDeviceRegistrationRepository::new(db_client)
    }
}
