//! Anthropic Claude provider implementation.
//!
//! Non-streaming `v1/messages` client. The system message travels in a
//! separate request field rather than the messages array.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, LlmResult};
use crate::provider::{
    ChatMessage, ChatRole, Completion, CompletionOptions, CompletionProvider, TokenUsage,
};

/// Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Supported Anthropic models
const SUPPORTED_MODELS: &[&str] = &[
    "claude-sonnet-4-5-20250929",
    "claude-opus-4-1-20250805",
    "claude-sonnet-4-20250514",
    "claude-3-5-haiku-20241022",
];

/// Messages API request message
#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

/// Messages API response content block
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// Messages API usage
#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Messages API response
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    usage: ApiUsage,
}

/// Messages API error
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Messages API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Convert messages to the Anthropic format, extracting the system message.
    fn convert_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<ApiMessage>) {
        let mut system = None;
        let mut converted = Vec::new();

        for msg in messages {
            match msg.role {
                ChatRole::System => {
                    system = Some(msg.content.clone());
                }
                ChatRole::User => converted.push(ApiMessage {
                    role: "user".to_string(),
                    content: msg.content.clone(),
                }),
                ChatRole::Assistant => converted.push(ApiMessage {
                    role: "assistant".to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        (system, converted)
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn api_key_env_var(&self) -> &'static str {
        "ANTHROPIC_API_KEY"
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
            env_var: "ANTHROPIC_API_KEY",
        })?;

        let (system, converted_messages) = Self::convert_messages(messages);

        let request = MessagesRequest {
            model: model.to_string(),
            messages: converted_messages,
            max_tokens: options.max_tokens.unwrap_or(4096),
            system,
            temperature: options.temperature,
            stop_sequences: options.stop_sequences.clone(),
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(LlmError::Api {
                    provider: "anthropic",
                    message: format!(
                        "{} - {}",
                        error_response.error.error_type, error_response.error.message
                    ),
                });
            }
            return Err(LlmError::Api {
                provider: "anthropic",
                message: format!("({status}): {body}"),
            });
        }

        let api_response: MessagesResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ResponseParse {
                provider: "anthropic",
                reason: e.to_string(),
            })?;

        let text = api_response
            .content
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage: TokenUsage {
                input_tokens: api_response.usage.input_tokens,
                output_tokens: api_response.usage.output_tokens,
                total_tokens: api_response.usage.input_tokens + api_response.usage.output_tokens,
            },
            model: api_response.model,
            provider: "anthropic".to_string(),
        })
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::from_env()
    }
}
