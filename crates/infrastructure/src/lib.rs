//! GigaChat Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: reqwest-backed clients for the provider's OAuth
//! token endpoint and chat-completions endpoint, the system clock, and
//! environment-based configuration.

pub mod adapters;
pub mod auth;
pub mod chat;
pub mod config;

pub use adapters::SystemClock;
pub use auth::OAuthTokenClient;
pub use chat::CompletionsHttpClient;
pub use config::{ConfigError, GigaChatConfig};
