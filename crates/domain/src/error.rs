//! Error taxonomy for token acquisition and chat completion.

use thiserror::Error;

/// Errors raised while acquiring a bearer token.
///
/// `Clone` is required: one failed refresh is fanned out verbatim to every
/// caller coalesced behind it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token request never produced an HTTP response.
    #[error("token request failed: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned {status}: {message}")]
    Endpoint {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// The response parsed but carried no `access_token` field.
    #[error("no access token in response")]
    MissingAccessToken,

    /// The response body was not the expected JSON shape.
    #[error("malformed token response: {message}")]
    MalformedResponse {
        /// Parse error description.
        message: String,
    },

    /// The in-flight refresh was abandoned before publishing an outcome.
    #[error("token refresh was interrupted")]
    Interrupted,
}

/// Errors raised by a chat-completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Acquiring a token for the call failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The completion endpoint rejected the token with HTTP 401.
    ///
    /// The cached token has been invalidated; re-invoking the operation
    /// acquires a fresh one. This client never retries automatically.
    #[error("token expired, please retry")]
    TokenExpired,

    /// The completion request never produced an HTTP response.
    #[error("completion request failed: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// The completion endpoint answered with a non-success status.
    #[error("completion endpoint returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// The response lacked `choices[0].message.content`.
    #[error("malformed completion response: {message}")]
    MalformedResponse {
        /// Description of the missing or mistyped field.
        message: String,
    },
}

impl CompletionError {
    /// True when the caller should re-invoke the operation to pick up a
    /// fresh token.
    #[must_use]
    pub const fn is_token_expired(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}
