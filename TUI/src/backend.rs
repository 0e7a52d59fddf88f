// Backend communication with the generation service over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{ConfigError, GenerationError};

/// Payload sent to `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub project_name: String,
}

/// Body of a non-success response. Each field is read on its own, so a
/// malformed `detail` never hides a usable `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

impl ErrorBody {
    fn parse(body: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
            return Self::default();
        };
        let field = |name: &str| value.get(name).and_then(|v| v.as_str()).map(str::to_string);
        Self {
            error: field("error"),
            detail: field("detail"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Anything that can turn a request into archive bytes.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issue exactly one generation request. No retries.
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError>;

    async fn health(&self) -> Result<HealthResponse, GenerationError>;
}

pub struct HttpGenerationClient {
    client: Client,
    config: ServiceConfig,
}

impl HttpGenerationClient {
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        let url = self.config.generate_url();
        debug!(url = %url, project_name = %request.project_name, "Sending generation request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await?;
            let parsed = ErrorBody::parse(&body);
            debug!(status = status.as_u16(), error = ?parsed.error, "Generation service rejected request");
            return Err(GenerationError::from_service_body(parsed.error, parsed.detail));
        }

        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "Received archive");
        Ok(bytes.to_vec())
    }

    async fn health(&self) -> Result<HealthResponse, GenerationError> {
        let response = self.client.get(self.config.health_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Service(format!("health check returned {}", status)));
        }
        Ok(response.json::<HealthResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_single_response, unused_local_url, MockResponse};

    fn client_for(base_url: &str) -> HttpGenerationClient {
        HttpGenerationClient::new(ServiceConfig::new(base_url).unwrap()).unwrap()
    }

    fn request(prompt: &str, project_name: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            project_name: project_name.to_string(),
        }
    }

    #[test]
    fn test_request_serializes_wire_fields() {
        let json = serde_json::to_value(request("todo app", "myapp")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"prompt": "todo app", "project_name": "myapp"})
        );
    }

    #[test]
    fn test_error_body_tolerates_missing_fields() {
        let body = ErrorBody::parse(br#"{"message": "nope"}"#);
        assert_eq!(body, ErrorBody::default());
        assert_eq!(ErrorBody::parse(b"<h1>boom</h1>"), ErrorBody::default());
        assert_eq!(ErrorBody::parse(br#"["invalid prompt"]"#), ErrorBody::default());
    }

    #[test]
    fn test_error_body_keeps_error_when_detail_is_not_text() {
        let body = ErrorBody::parse(br#"{"error": "invalid prompt", "detail": {"field": "prompt"}}"#);
        assert_eq!(body.error.as_deref(), Some("invalid prompt"));
        assert!(body.detail.is_none());

        let body = ErrorBody::parse(br#"{"error": 42, "detail": "too long"}"#);
        assert!(body.error.is_none());
        assert_eq!(body.detail.as_deref(), Some("too long"));
    }

    #[tokio::test]
    async fn test_generate_success_returns_raw_bytes() {
        let archive = vec![0x50, 0x4b, 0x03, 0x04, 0x00, 0xff, 0x10];
        let Some(server) =
            spawn_single_response(MockResponse::new("200 OK", "application/zip", archive.clone()))
                .await
        else {
            return;
        };

        let bytes = client_for(&server.base_url)
            .generate(&request("todo app", "myapp"))
            .await
            .unwrap();
        assert_eq!(bytes, archive);

        let raw = server.request().await;
        assert!(raw.starts_with("POST /generate HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let sent: GenerationRequest = serde_json::from_str(body).unwrap();
        assert_eq!(sent, request("todo app", "myapp"));
    }

    #[tokio::test]
    async fn test_generate_service_error_surfaces_error_field() {
        let Some(server) = spawn_single_response(MockResponse::json(
            "400 Bad Request",
            r#"{"error": "invalid prompt"}"#,
        ))
        .await
        else {
            return;
        };

        let err = client_for(&server.base_url)
            .generate(&request("x", "myapp"))
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Service("invalid prompt".into()));
    }

    #[tokio::test]
    async fn test_generate_structured_detail_keeps_error_text() {
        let Some(server) = spawn_single_response(MockResponse::json(
            "400 Bad Request",
            r#"{"error": "invalid prompt", "detail": {"field": "prompt"}}"#,
        ))
        .await
        else {
            return;
        };

        let err = client_for(&server.base_url)
            .generate(&request("x", "myapp"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: invalid prompt");
    }

    #[tokio::test]
    async fn test_generate_non_json_error_body_uses_fallback() {
        let Some(server) = spawn_single_response(MockResponse::new(
            "500 Internal Server Error",
            "text/html",
            b"<h1>boom</h1>".to_vec(),
        ))
        .await
        else {
            return;
        };

        let err = client_for(&server.base_url)
            .generate(&request("x", "myapp"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: Unknown error");
    }

    #[tokio::test]
    async fn test_generate_empty_error_body_uses_fallback() {
        let Some(server) = spawn_single_response(MockResponse::new(
            "502 Bad Gateway",
            "application/json",
            Vec::new(),
        ))
        .await
        else {
            return;
        };

        let err = client_for(&server.base_url)
            .generate(&request("x", "myapp"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: Unknown error");
    }

    #[tokio::test]
    async fn test_generate_cut_off_error_body_is_transport_error() {
        let Some(server) = spawn_single_response(MockResponse::truncated(
            "500 Internal Server Error",
            r#"{"error": "inval"#,
            256,
        ))
        .await
        else {
            return;
        };

        let err = client_for(&server.base_url)
            .generate(&request("x", "myapp"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, GenerationError::Transport(_)),
            "expected transport error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_generate_connection_refused_is_transport_error() {
        let Some(base_url) = unused_local_url().await else {
            return;
        };

        let err = client_for(&base_url)
            .generate(&request("x", "myapp"))
            .await
            .unwrap_err();
        match err {
            GenerationError::Transport(message) => assert!(!message.is_empty()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health_parses_status() {
        let Some(server) = spawn_single_response(MockResponse::json(
            "200 OK",
            r#"{"status": "ok", "time": "2026-01-01T00:00:00"}"#,
        ))
        .await
        else {
            return;
        };

        let health = client_for(&server.base_url).health().await.unwrap();
        assert!(health.is_ok());
        assert_eq!(health.time.as_deref(), Some("2026-01-01T00:00:00"));
        assert!(server.request().await.starts_with("GET /health HTTP/1.1"));
    }
}
