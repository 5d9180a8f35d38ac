//! Model registry: provider inference and API key resolution.

use std::collections::HashMap;

use parking_lot::RwLock;

use baton_core::errors::ProviderName;

/// Infer the provider from a model identifier.
#[must_use]
pub fn provider_for_model(model: &str) -> ProviderName {
    if model.starts_with("claude-") {
        ProviderName::Anthropic
    } else if model.starts_with("gpt-") || model.starts_with("o1") || model.starts_with("o3") {
        ProviderName::Openai
    } else if model.starts_with("gemini-") {
        ProviderName::Google
    } else {
        ProviderName::Unknown
    }
}

/// Holds API keys per provider and resolves them per model.
#[derive(Default)]
pub struct ModelRegistry {
    keys: RwLock<HashMap<ProviderName, String>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an API key for a provider.
    pub fn set_api_key(&self, provider: ProviderName, key: impl Into<String>) {
        let _ = self.keys.write().insert(provider, key.into());
    }

    /// Resolve the API key for a model via its provider.
    #[must_use]
    pub fn get_api_key(&self, model: &str) -> Option<String> {
        let provider = provider_for_model(model);
        self.keys.read().get(&provider).cloned()
    }
}
