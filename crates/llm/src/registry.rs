//! Provider registry.
//!
//! Maps model names to provider instances so callers can say
//! "deepseek-chat" or "claude-sonnet-4-5-20250929" in configuration
//! without caring which API answers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{LlmError, LlmResult};
use crate::provider::CompletionProvider;

/// Registry of completion providers.
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn CompletionProvider>>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a provider.
    pub fn register(&self, provider: Arc<dyn CompletionProvider>) {
        let mut providers = self.providers.write().unwrap();
        providers.insert(provider.name().to_string(), provider);
    }

    /// Get a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CompletionProvider>> {
        let providers = self.providers.read().unwrap();
        providers.get(name).cloned()
    }

    /// Get a provider that supports a specific model.
    pub fn get_for_model(&self, model: &str) -> Option<Arc<dyn CompletionProvider>> {
        let providers = self.providers.read().unwrap();
        providers
            .values()
            .find(|p| p.supports_model(model))
            .cloned()
    }

    /// Get a provider for a model, returning an error if none supports it.
    pub fn require_for_model(&self, model: &str) -> LlmResult<Arc<dyn CompletionProvider>> {
        self.get_for_model(model).ok_or_else(|| LlmError::UnknownModel {
            model: model.to_string(),
        })
    }

    /// All registered provider names.
    pub fn provider_names(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap();
        providers.keys().cloned().collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deepseek::DeepSeekProvider;

    #[test]
    fn test_registry_starts_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.provider_names().is_empty());
        assert!(registry.get_for_model("deepseek-chat").is_none());
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(DeepSeekProvider::new("key")));

        assert!(registry.get("deepseek").is_some());
        assert!(registry.get_for_model("deepseek-chat").is_some());
        assert!(registry.require_for_model("deepseek-reasoner").is_ok());
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(DeepSeekProvider::new("key")));

        let err = registry.require_for_model("gpt-4o").err().unwrap();
        assert!(err.to_string().contains("gpt-4o"));
    }
}
