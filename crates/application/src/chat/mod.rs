//! Chat completion use case.

mod client;

pub use client::ChatClient;
