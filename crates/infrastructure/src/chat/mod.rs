//! Chat-completions endpoint adapter.

mod completions_client;

pub use completions_client::CompletionsHttpClient;
