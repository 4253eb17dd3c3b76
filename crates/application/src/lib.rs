//! GigaChat Application - Token coordination and chat use cases
//!
//! This crate owns the token-refresh coordination (single-flight) and the
//! chat-completion use case. All I/O happens behind the ports defined in
//! [`ports`], so every concurrency and failure property is testable without
//! a network.

pub mod auth;
pub mod chat;
pub mod ports;

pub use auth::TokenCoordinator;
pub use chat::ChatClient;
pub use ports::{Clock, CompletionTransport, TokenSource};
