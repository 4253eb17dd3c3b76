//! GigaChat Domain - Core types
//!
//! This crate defines the domain model for the GigaChat API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod chat;
pub mod error;
pub mod token;

pub use chat::{ChatMessage, CompletionOptions, Role};
pub use error::{CompletionError, TokenError};
pub use token::{AccessToken, TokenStatus};
