//! Repository modules for database access
//!
//! Only one entity lives here today: the device registration.

pub mod device_registration;
pub mod device_registration_factory;
pub mod device_registration_sql;

// Re-export the device registration repository and factory for ease of use
pub use device_registration::{
    DeactivateOutcome, DeviceRegistration, DeviceRegistrationRepository, NewRegistration,
};
pub use device_registration_factory::DeviceRegistrationRepositoryFactory;
pub use device_registration_sql::SqlDeviceRegistrationRepository;
