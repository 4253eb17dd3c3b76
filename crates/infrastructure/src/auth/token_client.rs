//! OAuth token endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use gigachat_application::TokenSource;
use gigachat_domain::TokenError;
use serde_json::Value;
use uuid::Uuid;

use crate::config::{ConfigError, GigaChatConfig};

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Fetches bearer tokens from the provider's OAuth endpoint.
///
/// Each attempt carries a freshly generated `RqUID` correlation id and the
/// configured Basic credential; the body is a single `scope` parameter.
pub struct OAuthTokenClient {
    http: reqwest::Client,
    token_url: String,
    auth_key: String,
    scope: String,
    timeout: Duration,
}

impl OAuthTokenClient {
    /// Creates a token client from the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::HttpClient` when the HTTP client cannot be
    /// built.
    pub fn new(config: &GigaChatConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_client(config, config.build_http_client()?))
    }

    /// Creates a token client over an existing reqwest client.
    #[must_use]
    pub fn with_client(config: &GigaChatConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            auth_key: config.auth_key.clone(),
            scope: config.scope.clone(),
            timeout: config.token_timeout,
        }
    }
}

#[async_trait]
impl TokenSource for OAuthTokenClient {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        let rq_uid = Uuid::new_v4().to_string();
        let body = serde_urlencoded::to_string([("scope", self.scope.as_str())]).map_err(|e| {
            TokenError::Network {
                message: format!("failed to encode form: {e}"),
            }
        })?;

        tracing::debug!(rq_uid = %rq_uid, "requesting token");
        let response = self
            .http
            .post(&self.token_url)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .header("Accept", "application/json")
            .header("RqUID", &rq_uid)
            .header("Authorization", format!("Basic {}", self.auth_key))
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| TokenError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TokenError::Endpoint {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response.json().await.map_err(|e| {
            TokenError::MalformedResponse {
                message: e.to_string(),
            }
        })?;

        match payload.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(token.to_owned()),
            _ => Err(TokenError::MissingAccessToken),
        }
    }
}
