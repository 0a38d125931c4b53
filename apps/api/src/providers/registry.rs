use std::collections::HashMap;
use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::providers::chat::ChatCompletionsProvider;
use crate::providers::{Provider, ProviderError, ProviderKind};

/// Produces a provider instance on demand.
pub type ProviderFactory = Arc<dyn Fn() -> Arc<dyn Provider> + Send + Sync>;

/// Maps a provider name to the factory that builds it.
///
/// Names are matched case-insensitively. Unlike the endpoint table, an
/// unregistered name is an error rather than a silent fallback.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers openai, deepseek, and qwen over the shared HTTP client.
    pub fn with_defaults(llm: LlmClient) -> Self {
        let mut registry = Self::new();
        for kind in ProviderKind::ALL {
            let llm = llm.clone();
            registry.register(kind.name(), move || {
                Arc::new(ChatCompletionsProvider::new(kind, llm.clone())) as Arc<dyn Provider>
            });
        }
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Provider> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.trim().to_lowercase(), Arc::new(factory));
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        self.factories
            .get(&name.trim().to_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| ProviderError::Unknown(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
