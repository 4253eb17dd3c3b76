//! Client configuration.
//!
//! Credentials and endpoints are injected here by the composition root;
//! nothing in this workspace embeds credential material.

use std::time::Duration;

use base64::Engine;
use thiserror::Error;

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";

/// Default chat-completions endpoint.
pub const DEFAULT_CHAT_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1/chat/completions";

/// Default OAuth scope for personal API access.
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";

/// Token requests are short; completions can take a while to generate.
const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No credential was provided.
    #[error(
        "missing credentials: set GIGACHAT_AUTH_KEY, or GIGACHAT_CLIENT_ID and GIGACHAT_CLIENT_SECRET"
    )]
    MissingCredentials,

    /// An environment variable carried an unusable value.
    #[error("invalid value for {name}: {message}")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Settings for the GigaChat endpoints.
#[derive(Debug, Clone)]
pub struct GigaChatConfig {
    /// OAuth token endpoint URL.
    pub token_url: String,
    /// Chat-completions endpoint URL.
    pub chat_url: String,
    /// Pre-encoded Basic credential (`base64(client_id:client_secret)`),
    /// as issued by the provider.
    pub auth_key: String,
    /// OAuth scope sent with every token request.
    pub scope: String,
    /// Timeout for token requests.
    pub token_timeout: Duration,
    /// Timeout for completion requests.
    pub completion_timeout: Duration,
    /// Disables TLS certificate validation. Development only; never enable
    /// against real credentials.
    pub danger_accept_invalid_certs: bool,
}

impl GigaChatConfig {
    /// Creates a configuration with provider defaults and the given
    /// pre-encoded Basic credential.
    #[must_use]
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            chat_url: DEFAULT_CHAT_URL.to_string(),
            auth_key: auth_key.into(),
            scope: DEFAULT_SCOPE.to_string(),
            token_timeout: TOKEN_TIMEOUT,
            completion_timeout: COMPLETION_TIMEOUT,
            danger_accept_invalid_certs: false,
        }
    }

    /// Creates a configuration from a client credential pair, encoding the
    /// Basic credential itself.
    #[must_use]
    pub fn with_credentials(client_id: &str, client_secret: &str) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{client_id}:{client_secret}"));
        Self::new(encoded)
    }

    /// Overrides the token endpoint URL.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Overrides the chat-completions endpoint URL.
    #[must_use]
    pub fn with_chat_url(mut self, url: impl Into<String>) -> Self {
        self.chat_url = url.into();
        self
    }

    /// Overrides the OAuth scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Reads the configuration from the environment.
    ///
    /// `GIGACHAT_AUTH_KEY` (or the `GIGACHAT_CLIENT_ID` /
    /// `GIGACHAT_CLIENT_SECRET` pair) is required. `GIGACHAT_TOKEN_URL`,
    /// `GIGACHAT_CHAT_URL`, `GIGACHAT_SCOPE`, and `GIGACHAT_INSECURE_TLS`
    /// override the defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` when no credential is set or a variable
    /// carries an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("GIGACHAT_AUTH_KEY") {
            Ok(key) if !key.is_empty() => Self::new(key),
            _ => {
                let id = std::env::var("GIGACHAT_CLIENT_ID");
                let secret = std::env::var("GIGACHAT_CLIENT_SECRET");
                match (id, secret) {
                    (Ok(id), Ok(secret)) if !id.is_empty() && !secret.is_empty() => {
                        Self::with_credentials(&id, &secret)
                    }
                    _ => return Err(ConfigError::MissingCredentials),
                }
            }
        };

        if let Ok(url) = std::env::var("GIGACHAT_TOKEN_URL") {
            config.token_url = url;
        }
        if let Ok(url) = std::env::var("GIGACHAT_CHAT_URL") {
            config.chat_url = url;
        }
        if let Ok(scope) = std::env::var("GIGACHAT_SCOPE") {
            config.scope = scope;
        }
        if let Ok(flag) = std::env::var("GIGACHAT_INSECURE_TLS") {
            config.danger_accept_invalid_certs = match flag.as_str() {
                "1" | "true" => true,
                "0" | "false" | "" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        name: "GIGACHAT_INSECURE_TLS".to_string(),
                        message: format!("expected 0/1/true/false, got {other:?}"),
                    });
                }
            };
        }

        Ok(config)
    }

    /// Builds a reqwest client honoring the TLS setting.
    ///
    /// # Errors
    /// Returns `ConfigError::HttpClient` when the client cannot be built.
    pub fn build_http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if self.danger_accept_invalid_certs {
            tracing::warn!(
                "TLS certificate validation is DISABLED; this must never reach production"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = GigaChatConfig::new("key");
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.chat_url, DEFAULT_CHAT_URL);
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert!(!config.danger_accept_invalid_certs);
    }

    #[test]
    fn test_credential_pair_is_base64_encoded() {
        let config = GigaChatConfig::with_credentials("user", "pass");
        // "user:pass" base64 encoded is "dXNlcjpwYXNz"
        assert_eq!(config.auth_key, "dXNlcjpwYXNz");
    }

    #[test]
    fn test_builder_overrides() {
        let config = GigaChatConfig::new("key")
            .with_token_url("http://localhost:1/oauth")
            .with_chat_url("http://localhost:1/chat")
            .with_scope("GIGACHAT_API_CORP");
        assert_eq!(config.token_url, "http://localhost:1/oauth");
        assert_eq!(config.chat_url, "http://localhost:1/chat");
        assert_eq!(config.scope, "GIGACHAT_API_CORP");
    }
}
