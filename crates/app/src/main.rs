//! GigaChat client demo - Main Entry Point
//!
//! Composition root: builds the configuration from the environment, wires
//! the token coordinator and chat client, and sends one message from the
//! command line.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use gigachat_application::{ChatClient, TokenCoordinator};
use gigachat_domain::{ChatMessage, CompletionOptions};
use gigachat_infrastructure::{
    CompletionsHttpClient, GigaChatConfig, OAuthTokenClient, SystemClock,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (system_file, prompt) = parse_args(std::env::args().skip(1))?;

    let config = GigaChatConfig::from_env()?;
    let tokens = Arc::new(TokenCoordinator::new(
        Arc::new(OAuthTokenClient::new(&config)?),
        Arc::new(SystemClock::new()),
    ));
    let client = ChatClient::new(
        Arc::new(CompletionsHttpClient::new(&config)?),
        Arc::clone(&tokens),
    );

    let mut messages = Vec::new();
    if let Some(path) = system_file {
        messages.push(ChatMessage::system(std::fs::read_to_string(path)?));
    }
    messages.push(ChatMessage::user(prompt));

    let mut options = CompletionOptions::new();
    if let Ok(model) = std::env::var("GIGACHAT_MODEL") {
        options = options.with_model(model);
    }

    let reply = client.complete_chat(&messages, &options).await?;
    println!("{reply}");

    tracing::info!(token = %tokens.status().summary(), "request complete");
    Ok(())
}

/// Splits the command line into an optional `--system <file>` instruction
/// file and the message text.
fn parse_args(
    args: impl Iterator<Item = String>,
) -> Result<(Option<PathBuf>, String), String> {
    let mut args = args;
    let mut system_file = None;
    let mut words = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--system" {
            let path = args.next().ok_or("--system requires a file path")?;
            system_file = Some(PathBuf::from(path));
        } else {
            words.push(arg);
        }
    }

    if words.is_empty() {
        return Err("usage: gigachat [--system <file>] <message>".to_string());
    }
    Ok((system_file, words.join(" ")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| (*s).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_message_words_are_joined() {
        let (system, prompt) = parse_args(args(&["hello", "there"])).unwrap();
        assert_eq!(system, None);
        assert_eq!(prompt, "hello there");
    }

    #[test]
    fn test_system_file_is_extracted() {
        let (system, prompt) =
            parse_args(args(&["--system", "instructions.txt", "hello"])).unwrap();
        assert_eq!(system, Some(PathBuf::from("instructions.txt")));
        assert_eq!(prompt, "hello");
    }

    #[test]
    fn test_empty_message_is_rejected() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--system", "file.txt"])).is_err());
    }
}
