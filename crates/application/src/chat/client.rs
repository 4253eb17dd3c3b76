//! Chat completion calls against the provider, authenticated through the
//! token coordinator.

use std::sync::Arc;

use gigachat_domain::{ChatMessage, CompletionError, CompletionOptions};
use serde_json::Value;

use crate::auth::TokenCoordinator;
use crate::ports::CompletionTransport;

/// Sends chat completions with coordinator-managed bearer tokens.
///
/// On HTTP 401 the cached token is invalidated and
/// [`CompletionError::TokenExpired`] is returned; re-invoking the operation
/// acquires a fresh token. No call is retried automatically.
pub struct ChatClient {
    transport: Arc<dyn CompletionTransport>,
    tokens: Arc<TokenCoordinator>,
}

impl ChatClient {
    /// Creates a client over the given transport and token coordinator.
    #[must_use]
    pub fn new(transport: Arc<dyn CompletionTransport>, tokens: Arc<TokenCoordinator>) -> Self {
        Self { transport, tokens }
    }

    /// The token coordinator backing this client.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenCoordinator> {
        &self.tokens
    }

    /// Sends one user message and returns the model's reply.
    ///
    /// # Errors
    /// See [`ChatClient::complete_chat`].
    pub async fn send_message(
        &self,
        text: impl Into<String> + Send,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        self.complete_chat(&[ChatMessage::user(text)], options).await
    }

    /// Sends a full conversation and returns the model's reply.
    ///
    /// # Errors
    /// - `CompletionError::Token` when no token could be acquired
    /// - `CompletionError::TokenExpired` when the provider rejected the
    ///   token (the cache has been invalidated; retry the call)
    /// - `CompletionError::Network` / `CompletionError::Status` for
    ///   transport and HTTP failures
    /// - `CompletionError::MalformedResponse` when the reply lacks
    ///   `choices[0].message.content`
    pub async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let token = self.tokens.token(false).await?;
        let body = options.request_body(messages);

        tracing::debug!(messages = messages.len(), "sending chat completion request");
        let response = match self.transport.post_chat(&token, &body).await {
            Ok(response) => response,
            Err(err) if err.is_token_expired() => {
                tracing::info!("completion rejected with 401, invalidating cached token");
                self.tokens.invalidate();
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        extract_content(&response)
    }
}

/// Pulls `choices[0].message.content` out of the provider response.
fn extract_content(response: &Value) -> Result<String, CompletionError> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| CompletionError::MalformedResponse {
            message: "missing choices[0].message.content".to_string(),
        })
}
