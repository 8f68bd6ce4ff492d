use utoipa::OpenApi;

use crate::handlers;
use pushreg_common::{
    CleanupTokensResponse, DeactivateDeviceRequest, DeactivateDeviceResponse, DeviceType,
    ErrorCode, ErrorResponse, HealthResponse, RegisterDeviceRequest, RegisterDeviceResponse,
    UserTokensResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_device_handler,
        handlers::deactivate_device_handler,
        handlers::user_tokens_handler,
        handlers::cleanup_tokens_handler,
        handlers::health_handler,
    ),
    components(
        schemas(
            RegisterDeviceRequest,
            RegisterDeviceResponse,
            DeactivateDeviceRequest,
            DeactivateDeviceResponse,
            UserTokensResponse,
            CleanupTokensResponse,
            HealthResponse,
            ErrorResponse,
            ErrorCode,
            DeviceType,
        )
    ),
    tags(
        (name = "Registry", description = "Push notification device token registry")
    )
)]
pub struct RegistryApiDoc;
