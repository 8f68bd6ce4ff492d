// --- File: crates/pushreg_common/src/models.rs ---

// Data structures shared by the registry service and the registration agent:
// the registration row itself and the JSON bodies of the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{validation_error, ErrorCode, RegistryError};

/// Platform of a registered install
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Ios,
    Android,
    Web,
}

impl DeviceType {
    pub const ALL: [DeviceType; 3] = [DeviceType::Ios, DeviceType::Android, DeviceType::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Ios => "ios",
            DeviceType::Android => "android",
            DeviceType::Web => "web",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ios" => Ok(DeviceType::Ios),
            "android" => Ok(DeviceType::Android),
            "web" => Ok(DeviceType::Web),
            other => Err(validation_error(format!(
                "device_type must be one of ios, android, web (got '{}')",
                other
            ))),
        }
    }
}

/// Represents a device registration
///
/// One row per (user, physical device install). At most one registration exists
/// for any `(user_id, device_id)` pair; inactive rows are kept until swept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistration {
    /// Server-assigned surrogate identifier
    pub id: i64,

    /// The caller-supplied user key
    pub user_id: String,

    /// Stable identifier of one app install
    pub device_id: String,

    /// Opaque destination issued by the platform push provider
    pub push_address: String,

    /// Platform of the install
    pub device_type: DeviceType,

    /// `true` means deliverable, `false` means soft-revoked
    pub is_active: bool,

    /// Set once at first insert
    pub created_at: DateTime<Utc>,

    /// Bumped on every insert or update
    pub updated_at: DateTime<Utc>,
}

/// A validated registration request, ready for the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub user_id: String,
    pub device_id: String,
    pub push_address: String,
    pub device_type: DeviceType,
}

// --- Wire types ---

/// Request body for `POST /register-device`
///
/// Fields default to empty so that a missing field is reported as a validation
/// failure rather than a deserialization failure.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub push_address: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_type: String,
}

impl RegisterDeviceRequest {
    /// Validates the request and converts it into a [`NewRegistration`].
    pub fn validate(&self) -> Result<NewRegistration, RegistryError> {
        crate::validation::validate_user_id(&self.user_id)?;
        crate::validation::validate_push_address(&self.push_address)?;
        crate::validation::validate_device_id(&self.device_id)?;
        crate::validation::validate_required("device_type", &self.device_type)?;
        let device_type = self.device_type.parse::<DeviceType>()?;

        Ok(NewRegistration {
            user_id: self.user_id.clone(),
            device_id: self.device_id.clone(),
            push_address: self.push_address.clone(),
            device_type,
        })
    }
}

/// Response body for a successful registration
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDeviceResponse {
    pub success: bool,
    pub registration_id: i64,
}

/// Request body for `POST /deactivate-device`
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeactivateDeviceRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub device_id: String,
}

/// Response body for a successful deactivation
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateDeviceResponse {
    pub success: bool,
}

/// Response body for `GET /user-tokens/{user_id}`
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTokensResponse {
    pub success: bool,
    pub tokens: Vec<String>,
}

/// Response body for `POST /cleanup-tokens`
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupTokensResponse {
    pub success: bool,
    pub deleted_count: u64,
}

/// Response body for `GET /health`
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Envelope of every failure response
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorCode,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(device_type: &str) -> RegisterDeviceRequest {
        RegisterDeviceRequest {
            user_id: "u1".to_string(),
            push_address: "addr-a".to_string(),
            device_id: "dev-1".to_string(),
            device_type: device_type.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        let new = request("ios").validate().unwrap();
        assert_eq!(new.device_type, DeviceType::Ios);
        assert_eq!(new.user_id, "u1");
        assert_eq!(new.push_address, "addr-a");
    }

    #[test]
    fn test_desktop_is_rejected() {
        let err = request("desktop").validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let req: RegisterDeviceRequest =
            serde_json::from_str(r#"{"user_id":"u1","device_type":"web"}"#).unwrap();
        assert!(matches!(
            req.validate(),
            Err(RegistryError::ValidationError(_))
        ));

        let mut req = request("android");
        req.push_address = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_oversized_push_address_is_rejected() {
        let mut req = request("web");
        req.push_address = "a".repeat(crate::validation::MAX_PUSH_ADDRESS_LEN + 1);
        assert!(matches!(
            req.validate(),
            Err(RegistryError::ValidationError(_))
        ));
    }

    #[test]
    fn test_device_type_round_trips_through_str() {
        for device_type in DeviceType::ALL {
            assert_eq!(device_type.as_str().parse::<DeviceType>().unwrap(), device_type);
        }
    }

    proptest! {
        #[test]
        fn unknown_device_types_never_validate(s in "[a-zA-Z]{1,12}") {
            prop_assume!(!["ios", "android", "web"].contains(&s.as_str()));
            prop_assert!(request(&s).validate().is_err());
        }
    }
}
