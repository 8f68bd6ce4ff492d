//! HTTP handlers for the token registry
//!
//! Every handler answers with the success body on `200 OK`, or with the common
//! error envelope `{success:false, error, message}` rendered by [`RegistryError`].
//! Request bodies are extracted as `Result<Json<_>, JsonRejection>` so that a
//! malformed body is reported in that same envelope.

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
};
use pushreg_common::{
    CleanupTokensResponse, DeactivateDeviceRequest, DeactivateDeviceResponse, HealthResponse,
    RegisterDeviceRequest, RegisterDeviceResponse, RegistryError, UserTokensResponse,
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::service::SqlRegistryService;

/// Shared state for the registry handlers
#[derive(Clone)]
pub struct RegistryState {
    /// The service every handler delegates to
    pub service: Arc<SqlRegistryService>,
}

/// Handler for registering (or reactivating) a device
///
/// # Responses
///
/// - 200 OK: `{success:true, registration_id}`
/// - 400 Bad Request: missing field, unknown `device_type` or malformed body
/// - 500 Internal Server Error: storage failure
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/register-device",
    request_body = RegisterDeviceRequest,
    responses(
        (status = 200, description = "Device registered", body = RegisterDeviceResponse),
        (status = 400, description = "Validation error", body = pushreg_common::ErrorResponse),
        (status = 500, description = "Storage error", body = pushreg_common::ErrorResponse)
    ),
    tag = "Registry"
))]
pub async fn register_device_handler(
    State(state): State<Arc<RegistryState>>,
    payload: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> Result<Json<RegisterDeviceResponse>, RegistryError> {
    let Json(payload) = payload?;
    debug!("Register request for user: {}", payload.user_id);

    let registration_id = state.service.register(&payload).await?;

    Ok(Json(RegisterDeviceResponse {
        success: true,
        registration_id,
    }))
}

/// Handler for soft-revoking a device
///
/// # Responses
///
/// - 200 OK: `{success:true}`
/// - 400 Bad Request: validation error, or `ALREADY_INACTIVE`
/// - 404 Not Found: no registration for the pair
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/deactivate-device",
    request_body = DeactivateDeviceRequest,
    responses(
        (status = 200, description = "Device deactivated", body = DeactivateDeviceResponse),
        (status = 400, description = "Validation error or already inactive", body = pushreg_common::ErrorResponse),
        (status = 404, description = "No such registration", body = pushreg_common::ErrorResponse)
    ),
    tag = "Registry"
))]
pub async fn deactivate_device_handler(
    State(state): State<Arc<RegistryState>>,
    payload: Result<Json<DeactivateDeviceRequest>, JsonRejection>,
) -> Result<Json<DeactivateDeviceResponse>, RegistryError> {
    let Json(payload) = payload?;
    debug!(
        "Deactivate request for user: {} and device: {}",
        payload.user_id, payload.device_id
    );

    state.service.deactivate(&payload).await?;

    Ok(Json(DeactivateDeviceResponse { success: true }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/user-tokens/{user_id}",
    params(("user_id" = String, Path, description = "The user whose active push addresses are listed")),
    responses(
        (status = 200, description = "Active push addresses", body = UserTokensResponse),
        (status = 400, description = "Invalid user id", body = pushreg_common::ErrorResponse)
    ),
    tag = "Registry"
))]
pub async fn user_tokens_handler(
    State(state): State<Arc<RegistryState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserTokensResponse>, RegistryError> {
    let tokens = state.service.list_active_tokens(&user_id).await?;

    Ok(Json(UserTokensResponse {
        success: true,
        tokens,
    }))
}

/// Administrative trigger for the retention sweep
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/cleanup-tokens",
    responses(
        (status = 200, description = "Sweep finished", body = CleanupTokensResponse),
        (status = 500, description = "Storage error", body = pushreg_common::ErrorResponse)
    ),
    tag = "Registry"
))]
pub async fn cleanup_tokens_handler(
    State(state): State<Arc<RegistryState>>,
) -> Result<Json<CleanupTokensResponse>, RegistryError> {
    let deleted_count = state.service.cleanup().await.map_err(|e| {
        error!("On-demand cleanup failed: {}", e);
        e
    })?;

    Ok(Json(CleanupTokensResponse {
        success: true,
        deleted_count,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Registry"
))]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::routes;
    use axum::body::{Body, Bytes};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use pushreg_common::{ErrorCode, ErrorResponse};
    use pushreg_config::RetentionConfig;
    use pushreg_db::DbClient;
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let client = DbClient::from_url("sqlite::memory:").await.unwrap();
        let service = SqlRegistryService::from_db_client(client, &RetentionConfig::default())
            .await
            .unwrap();
        routes(Arc::new(service))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Bytes) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).unwrap()
    }

    fn register_body(push_address: &str, device_type: &str) -> serde_json::Value {
        json!({
            "user_id": "u1",
            "push_address": push_address,
            "device_id": "dev-1",
            "device_type": device_type,
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = parse(&body);
        assert_eq!(health.status, "OK");
    }

    #[tokio::test]
    async fn test_register_then_list() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/register-device",
            Some(register_body("addr-a", "ios")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let registered: RegisterDeviceResponse = parse(&body);
        assert!(registered.success);

        let (status, body) = send(&app, Method::GET, "/user-tokens/u1", None).await;
        assert_eq!(status, StatusCode::OK);
        let tokens: UserTokensResponse = parse(&body);
        assert_eq!(tokens.tokens, vec!["addr-a".to_string()]);
    }

    #[tokio::test]
    async fn test_register_desktop_is_validation_error() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/register-device",
            Some(register_body("addr-a", "desktop")),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = parse(&body);
        assert!(!err.success);
        assert_eq!(err.error, ErrorCode::ValidationError);

        let (_, body) = send(&app, Method::GET, "/user-tokens/u1", None).await;
        let tokens: UserTokensResponse = parse(&body);
        assert!(tokens.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let app = test_app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/register-device")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let err: ErrorResponse = parse(&bytes);
        assert_eq!(err.error, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_deactivate_status_codes() {
        let app = test_app().await;
        let deactivate = json!({"user_id": "u1", "device_id": "dev-1"});

        let (status, body) = send(
            &app,
            Method::POST,
            "/deactivate-device",
            Some(deactivate.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse::<ErrorResponse>(&body).error, ErrorCode::NotFound);

        send(
            &app,
            Method::POST,
            "/register-device",
            Some(register_body("addr-a", "android")),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/deactivate-device",
            Some(deactivate.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(parse::<DeactivateDeviceResponse>(&body).success);

        let (status, body) =
            send(&app, Method::POST, "/deactivate-device", Some(deactivate)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse::<ErrorResponse>(&body).error,
            ErrorCode::AlreadyInactive
        );
    }

    #[tokio::test]
    async fn test_cleanup_endpoint() {
        let app = test_app().await;

        let (status, body) = send(&app, Method::POST, "/cleanup-tokens", None).await;

        assert_eq!(status, StatusCode::OK);
        let cleanup: CleanupTokensResponse = parse(&body);
        assert!(cleanup.success);
        assert_eq!(cleanup.deleted_count, 0);
    }
}
