//! AI provider abstraction for the weekly report pipeline.
//!
//! This crate provides:
//! - A `CompletionProvider` trait over chat-completion APIs
//! - DeepSeek (OpenAI-compatible) and Anthropic implementations
//! - A registry that resolves a provider from a model name
//! - JSON response parsing that tolerates markdown code fences

pub mod error;
pub mod provider;
pub mod registry;

// Provider implementations
pub mod anthropic;
pub mod deepseek;

// Re-exports
pub use anthropic::AnthropicProvider;
pub use deepseek::DeepSeekProvider;
pub use error::{LlmError, LlmResult};
pub use provider::{
    parse_json_completion, ChatMessage, ChatRole, Completion, CompletionOptions,
    CompletionProvider, TokenUsage,
};
pub use registry::ProviderRegistry;
