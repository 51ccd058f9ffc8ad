//! Completion provider trait and common types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, LlmResult};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System message (sets context/behavior)
    System,
    /// User message (input)
    User,
    /// Assistant message (model response)
    Assistant,
}

/// A message in a conversation with a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: ChatRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Token usage reported by a completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
    /// Total tokens (input + output)
    pub total_tokens: u32,
}

/// Response from a completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text content
    pub text: String,
    /// Token usage information
    pub usage: TokenUsage,
    /// Model that generated the response
    pub model: String,
    /// Provider that generated the response
    pub provider: String,
}

/// Options for a completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop_sequences: Option<Vec<String>>,
    /// Whether to request JSON output
    pub json_mode: bool,
}

/// Trait implemented by every completion provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g. "deepseek", "anthropic").
    fn name(&self) -> &'static str;

    /// Environment variable holding the API key.
    fn api_key_env_var(&self) -> &'static str;

    /// Whether an API key is available.
    fn is_configured(&self) -> bool;

    /// Models this provider accepts.
    fn supported_models(&self) -> Vec<&str>;

    /// Check if a model is supported.
    fn supports_model(&self, model: &str) -> bool {
        self.supported_models().contains(&model)
    }

    /// Run a chat completion.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> LlmResult<Completion>;
}

/// Deserialize a JSON payload out of a completion.
///
/// Standalone function rather than a trait method because generic
/// methods are not dyn-compatible. Models sometimes wrap JSON in
/// markdown code fences; those are stripped first.
pub fn parse_json_completion<T: for<'de> Deserialize<'de>>(completion: &Completion) -> LlmResult<T> {
    let text = completion.text.trim();

    let json_text = if text.starts_with("```json") {
        text.strip_prefix("```json")
            .and_then(|s| s.strip_suffix("```"))
            .unwrap_or(text)
            .trim()
    } else if text.starts_with("```") {
        text.strip_prefix("```")
            .and_then(|s| s.strip_suffix("```"))
            .unwrap_or(text)
            .trim()
    } else {
        text
    };

    serde_json::from_str(json_text).map_err(|e| LlmError::ResponseParse {
        provider: "json",
        reason: format!("{e}. Response: {text}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion_with(text: &str) -> Completion {
        Completion {
            text: text.to_string(),
            usage: TokenUsage::default(),
            model: "test".to_string(),
            provider: "test".to_string(),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn test_parse_plain_json() {
        let c = completion_with(r#"{"value": 7}"#);
        let parsed: Payload = parse_json_completion(&c).unwrap();
        assert_eq!(parsed, Payload { value: 7 });
    }

    #[test]
    fn test_parse_fenced_json() {
        let c = completion_with("```json\n{\"value\": 7}\n```");
        let parsed: Payload = parse_json_completion(&c).unwrap();
        assert_eq!(parsed.value, 7);
    }

    #[test]
    fn test_parse_invalid_json() {
        let c = completion_with("not json at all");
        let result: LlmResult<Payload> = parse_json_completion(&c);
        assert!(result.is_err());
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("a").role, ChatRole::System);
        assert_eq!(ChatMessage::user("b").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("c").role, ChatRole::Assistant);
    }
}
