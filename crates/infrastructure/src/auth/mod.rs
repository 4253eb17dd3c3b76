//! Token endpoint adapter.

mod token_client;

pub use token_client::OAuthTokenClient;
