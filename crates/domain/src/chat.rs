//! Chat message and completion option types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Model requested when the caller does not override it.
pub const DEFAULT_MODEL: &str = "GigaChat";

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// End-user input.
    User,
    /// A previous model reply, for multi-turn context.
    Assistant,
}

/// A single turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Caller-supplied overrides for a completion request.
///
/// Every field is optional; unset fields fall back to the provider defaults
/// (`model = "GigaChat"`, `stream = false`, `repetition_penalty = 1`,
/// `temperature = 0.7`, `max_tokens = 1000`). Keys in `extra` are passed
/// through to the request body verbatim and win over everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Model name override.
    #[serde(default)]
    pub model: Option<String>,
    /// Streaming flag override. Streaming responses are not supported by
    /// this client; the flag exists so the wire format stays complete.
    #[serde(default)]
    pub stream: Option<bool>,
    /// Repetition penalty override.
    #[serde(default)]
    pub repetition_penalty: Option<f64>,
    /// Sampling temperature override.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Response length cap override.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Additional body fields, passed through verbatim.
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl CompletionOptions {
    /// Options using only provider defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the response length cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Adds a pass-through body field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Builds the JSON request body for the chat-completions endpoint.
    ///
    /// Defaults are written first, then the recognized overrides, then the
    /// `extra` map, so later layers shadow earlier ones.
    #[must_use]
    pub fn request_body(&self, messages: &[ChatMessage]) -> Value {
        let mut body = Map::new();
        body.insert(
            "model".to_string(),
            json!(self.model.as_deref().unwrap_or(DEFAULT_MODEL)),
        );
        body.insert("messages".to_string(), json!(messages));
        body.insert("stream".to_string(), json!(self.stream.unwrap_or(false)));
        body.insert(
            "repetition_penalty".to_string(),
            json!(self.repetition_penalty.unwrap_or(1.0)),
        );
        body.insert(
            "temperature".to_string(),
            json!(self.temperature.unwrap_or(0.7)),
        );
        body.insert(
            "max_tokens".to_string(),
            json!(self.max_tokens.unwrap_or(1000)),
        );
        for (key, value) in &self.extra {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
    }

    #[test]
    fn test_default_body() {
        let messages = vec![ChatMessage::user("hi")];
        let body = CompletionOptions::new().request_body(&messages);

        assert_eq!(body["model"], json!("GigaChat"));
        assert_eq!(body["stream"], json!(false));
        assert_eq!(body["repetition_penalty"], json!(1.0));
        assert_eq!(body["temperature"], json!(0.7));
        assert_eq!(body["max_tokens"], json!(1000));
        assert_eq!(body["messages"][0]["role"], json!("user"));
        assert_eq!(body["messages"][0]["content"], json!("hi"));
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let options = CompletionOptions::new()
            .with_model("GigaChat-Pro")
            .with_temperature(0.2)
            .with_max_tokens(64);
        let body = options.request_body(&[ChatMessage::user("hi")]);

        assert_eq!(body["model"], json!("GigaChat-Pro"));
        assert_eq!(body["temperature"], json!(0.2));
        assert_eq!(body["max_tokens"], json!(64));
        // Untouched keys keep their defaults.
        assert_eq!(body["stream"], json!(false));
    }

    #[test]
    fn test_extra_keys_pass_through_and_shadow() {
        let options = CompletionOptions::new()
            .with_extra("top_p", json!(0.9))
            .with_extra("max_tokens", json!(5));
        let body = options.request_body(&[ChatMessage::user("hi")]);

        assert_eq!(body["top_p"], json!(0.9));
        assert_eq!(body["max_tokens"], json!(5));
    }

    #[test]
    fn test_message_ordering_preserved() {
        let messages = vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
            ChatMessage::user("follow-up"),
        ];
        let body = CompletionOptions::new().request_body(&messages);
        let roles: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }
}
