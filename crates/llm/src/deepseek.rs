//! DeepSeek provider implementation.
//!
//! DeepSeek exposes an OpenAI-compatible `chat/completions` endpoint,
//! so the request and response shapes here follow that wire format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, LlmResult};
use crate::provider::{
    ChatMessage, ChatRole, Completion, CompletionOptions, CompletionProvider, TokenUsage,
};

/// Default API base URL
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Default model
const DEFAULT_MODEL: &str = "deepseek-chat";

/// Supported DeepSeek models
const SUPPORTED_MODELS: &[&str] = &["deepseek-chat", "deepseek-reasoner"];

/// Chat API request message
#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// Chat API response format selector
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// Chat API request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Chat API response choice message
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat API response choice
#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

/// Chat API usage
#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Chat API response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: ApiUsage,
}

/// Chat API error
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    error_type: Option<String>,
    #[allow(dead_code)]
    code: Option<String>,
}

/// Chat API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// DeepSeek chat-completion provider.
pub struct DeepSeekProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl DeepSeekProvider {
    /// Create a new provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: DEEPSEEK_BASE_URL.to_string(),
        }
    }

    /// Create from the `DEEPSEEK_API_KEY` environment variable.
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            api_key: std::env::var("DEEPSEEK_API_KEY").ok(),
            base_url: DEEPSEEK_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (useful for proxies and tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Convert messages to the OpenAI-compatible wire format.
    fn convert_messages(messages: &[ChatMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|msg| ApiMessage {
                role: match msg.role {
                    ChatRole::System => "system".to_string(),
                    ChatRole::User => "user".to_string(),
                    ChatRole::Assistant => "assistant".to_string(),
                },
                content: msg.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    fn api_key_env_var(&self) -> &'static str {
        "DEEPSEEK_API_KEY"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn supported_models(&self) -> Vec<&str> {
        SUPPORTED_MODELS.to_vec()
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> LlmResult<Completion> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingKey {
            env_var: "DEEPSEEK_API_KEY",
        })?;

        let response_format = if options.json_mode {
            Some(ResponseFormat {
                format_type: "json_object".to_string(),
            })
        } else {
            None
        };

        let request = ChatRequest {
            model: model.to_string(),
            messages: Self::convert_messages(messages),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stop: options.stop_sequences.clone(),
            response_format,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(LlmError::Api {
                    provider: "deepseek",
                    message: error_response.error.message,
                });
            }
            return Err(LlmError::Api {
                provider: "deepseek",
                message: format!("({status}): {body}"),
            });
        }

        let api_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ResponseParse {
                provider: "deepseek",
                reason: e.to_string(),
            })?;

        let text = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage: TokenUsage {
                input_tokens: api_response.usage.prompt_tokens,
                output_tokens: api_response.usage.completion_tokens,
                total_tokens: api_response.usage.total_tokens,
            },
            model: api_response.model,
            provider: "deepseek".to_string(),
        })
    }
}

impl Default for DeepSeekProvider {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Get the default DeepSeek model.
pub fn default_model() -> &'static str {
    DEFAULT_MODEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let provider = DeepSeekProvider::new("key");
        assert_eq!(provider.name(), "deepseek");
    }

    #[test]
    fn test_supported_models() {
        let provider = DeepSeekProvider::new("key");
        assert!(provider.supports_model("deepseek-chat"));
        assert!(provider.supports_model("deepseek-reasoner"));
        assert!(!provider.supports_model("gpt-4o"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = DeepSeekProvider::new("key").with_base_url("http://localhost:9999/");
        assert_eq!(provider.endpoint(), "http://localhost:9999/chat/completions");
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            ChatMessage::system("You write weekly reports"),
            ChatMessage::user("Hello"),
            ChatMessage::assistant("Hi there!"),
        ];

        let converted = DeepSeekProvider::convert_messages(&messages);

        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[1].role, "user");
        assert_eq!(converted[2].role, "assistant");
    }
}
