//! HTTP client for the token registry.
//!
//! Speaks the registry's JSON surface and turns its error envelope into
//! [`AgentError::Registry`]. No retries are made here.

use pushreg_common::http::client::create_client;
use pushreg_common::{
    CleanupTokensResponse, DeactivateDeviceRequest, ErrorCode, ErrorResponse, HealthResponse,
    RegisterDeviceRequest, RegisterDeviceResponse, UserTokensResponse,
};
use pushreg_config::AgentConfig;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AgentError;

#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    base_url: Url,
}

impl RegistryClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AgentError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AgentError::Config(format!("Invalid registry URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AgentError::Config(format!(
                "Registry URL '{}' cannot be used as a base",
                base_url
            )));
        }
        let http = create_client(timeout_secs, false)?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        Self::new(&config.registry_url, config.timeout_secs)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AgentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AgentError::Config(format!("Invalid registry URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AgentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await?;
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(envelope) => Err(AgentError::Registry {
                status: status.as_u16(),
                code: envelope.error,
                message: envelope.message,
            }),
            Err(_) => Err(AgentError::Registry {
                status: status.as_u16(),
                code: ErrorCode::Unknown,
                message: body,
            }),
        }
    }

    /// `POST /register-device`; returns the registration id.
    pub async fn register_device(
        &self,
        request: &RegisterDeviceRequest,
    ) -> Result<i64, AgentError> {
        debug!(
            "Registering device {} for user {}",
            request.device_id, request.user_id
        );
        let response = self
            .http
            .post(self.endpoint(&["register-device"])?)
            .json(request)
            .send()
            .await?;
        let body: RegisterDeviceResponse = Self::decode(response).await?;
        Ok(body.registration_id)
    }

    /// `POST /deactivate-device`
    pub async fn deactivate_device(&self, user_id: &str, device_id: &str) -> Result<(), AgentError> {
        debug!("Deactivating device {} for user {}", device_id, user_id);
        let request = DeactivateDeviceRequest {
            user_id: user_id.to_string(),
            device_id: device_id.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint(&["deactivate-device"])?)
            .json(&request)
            .send()
            .await?;
        Self::decode::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// `GET /user-tokens/{user_id}`, for notification producers fanning out a payload.
    pub async fn list_active_tokens(&self, user_id: &str) -> Result<Vec<String>, AgentError> {
        let response = self
            .http
            .get(self.endpoint(&["user-tokens", user_id])?)
            .send()
            .await?;
        let body: UserTokensResponse = Self::decode(response).await?;
        Ok(body.tokens)
    }

    /// `POST /cleanup-tokens`
    pub async fn cleanup_tokens(&self) -> Result<u64, AgentError> {
        let response = self
            .http
            .post(self.endpoint(&["cleanup-tokens"])?)
            .send()
            .await?;
        let body: CleanupTokensResponse = Self::decode(response).await?;
        Ok(body.deleted_count)
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<bool, AgentError> {
        let response = self.http.get(self.endpoint(&["health"])?).send().await?;
        let body: HealthResponse = Self::decode(response).await?;
        Ok(body.status == "OK")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn register_request() -> RegisterDeviceRequest {
        RegisterDeviceRequest {
            user_id: "u1".to_string(),
            push_address: "addr-a".to_string(),
            device_id: "dev-1".to_string(),
            device_type: "ios".to_string(),
        }
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RegistryClient::new("not a url", 5),
            Err(AgentError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_register_device_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register-device"))
            .and(body_json(json!({
                "user_id": "u1",
                "push_address": "addr-a",
                "device_id": "dev-1",
                "device_type": "ios"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "registration_id": 7})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = RegistryClient::new(&server.uri(), 5).unwrap();
        assert_eq!(client.register_device(&register_request()).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_error_envelope_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/deactivate-device"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "error": "ALREADY_INACTIVE",
                "message": "already inactive"
            })))
            .mount(&server)
            .await;

        let client = RegistryClient::new(&server.uri(), 5).unwrap();
        let err = client.deactivate_device("u1", "dev-1").await.unwrap_err();

        match err {
            AgentError::Registry { status, code, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code, ErrorCode::AlreadyInactive);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_envelope_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user-tokens/u1"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = RegistryClient::new(&server.uri(), 5).unwrap();
        let err = client.list_active_tokens("u1").await.unwrap_err();

        assert!(matches!(
            err,
            AgentError::Registry {
                status: 502,
                code: ErrorCode::Unknown,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_user_id_is_path_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user-tokens/user%2F1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "tokens": ["addr-a"]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = RegistryClient::new(&server.uri(), 5).unwrap();
        assert_eq!(
            client.list_active_tokens("user/1").await.unwrap(),
            vec!["addr-a".to_string()]
        );
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
            .mount(&server)
            .await;

        let client = RegistryClient::new(&server.uri(), 5).unwrap();
        assert!(client.health().await.unwrap());
    }
}
