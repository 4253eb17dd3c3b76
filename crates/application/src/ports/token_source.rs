//! Token source port
//!
//! Defines the interface to the provider's OAuth token endpoint.

use async_trait::async_trait;
use gigachat_domain::TokenError;

/// Port for fetching one fresh bearer token from the provider.
///
/// Implementations perform exactly one network request per call and do no
/// caching or coalescing of their own; that is the coordinator's job.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Requests a new access token from the token endpoint.
    ///
    /// # Errors
    /// Returns `TokenError` when the request fails, the endpoint answers
    /// with a non-success status, or the response carries no token.
    async fn fetch_token(&self) -> Result<String, TokenError>;
}
