//! Error types for the provider layer.

use thiserror::Error;

/// Errors that can occur when talking to a completion API.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API key is missing for the provider
    #[error("{env_var} not set and no key configured")]
    MissingKey { env_var: &'static str },

    /// The API returned an error response
    #[error("{provider} API error: {message}")]
    Api { provider: &'static str, message: String },

    /// The response body could not be parsed
    #[error("failed to parse {provider} response: {reason}")]
    ResponseParse { provider: &'static str, reason: String },

    /// No provider supports the requested model
    #[error("no provider configured for model: {model}")]
    UnknownModel { model: String },
}

/// Result alias for provider operations.
pub type LlmResult<T> = Result<T, LlmError>;
