//! Completion transport port
//!
//! Defines the interface to the provider's chat-completions endpoint.

use async_trait::async_trait;
use gigachat_domain::CompletionError;
use serde_json::Value;

/// Port for posting one chat-completion request.
///
/// Implementations send the prepared JSON body with the given bearer token
/// and return the provider's JSON response without interpreting it.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Posts `body` to the chat-completions endpoint.
    ///
    /// # Errors
    /// - `CompletionError::TokenExpired` when the endpoint answers HTTP 401
    /// - `CompletionError::Status` for any other non-success status
    /// - `CompletionError::Network` when no response was produced
    /// - `CompletionError::MalformedResponse` when the body is not JSON
    async fn post_chat(&self, token: &str, body: &Value) -> Result<Value, CompletionError>;
}
