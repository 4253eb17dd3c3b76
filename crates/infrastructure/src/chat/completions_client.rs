//! Chat-completions endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use gigachat_application::CompletionTransport;
use gigachat_domain::CompletionError;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::{ConfigError, GigaChatConfig};

/// Posts chat-completion requests to the provider.
pub struct CompletionsHttpClient {
    http: reqwest::Client,
    chat_url: String,
    timeout: Duration,
}

impl CompletionsHttpClient {
    /// Creates a completions client from the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::HttpClient` when the HTTP client cannot be
    /// built.
    pub fn new(config: &GigaChatConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_client(config, config.build_http_client()?))
    }

    /// Creates a completions client over an existing reqwest client.
    #[must_use]
    pub fn with_client(config: &GigaChatConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            chat_url: config.chat_url.clone(),
            timeout: config.completion_timeout,
        }
    }
}

#[async_trait]
impl CompletionTransport for CompletionsHttpClient {
    async fn post_chat(&self, token: &str, body: &Value) -> Result<Value, CompletionError> {
        let response = self
            .http
            .post(&self.chat_url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {token}"))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| CompletionError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("completion request rejected with 401");
            return Err(CompletionError::TokenExpired);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_against(server: &MockServer) -> CompletionsHttpClient {
        let config = GigaChatConfig::new("key")
            .with_chat_url(format!("{}/api/v1/chat/completions", server.uri()));
        CompletionsHttpClient::new(&config).unwrap()
    }

    fn chat_body() -> Value {
        json!({
            "model": "GigaChat",
            "messages": [{ "role": "user", "content": "hi" }],
            "stream": false,
        })
    }

    #[tokio::test]
    async fn test_post_sends_bearer_token_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("Authorization", "Bearer abc123"))
            .and(header("Accept", "application/json"))
            .and(header("Content-Type", "application/json"))
            .and(body_partial_json(json!({ "model": "GigaChat" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_against(&server);
        let response = client.post_chat("abc123", &chat_body()).await.unwrap();
        assert_eq!(
            response["choices"][0]["message"]["content"],
            json!("hello")
        );
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_token_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let err = client.post_chat("stale", &chat_body()).await.unwrap_err();
        assert!(err.is_token_expired());
    }

    #[tokio::test]
    async fn test_other_statuses_map_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let err = client.post_chat("abc", &chat_body()).await.unwrap_err();
        match err {
            CompletionError::Status { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_against(&server);
        let err = client.post_chat("abc", &chat_body()).await.unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse { .. }));
    }
}
