//! Provider Capability: the narrow seam between the evaluation core and a
//! remote model.
//!
//! A provider exposes two operations: a structured call that must come back
//! as a JSON object shaped by a schema, and a plain text call. The handlers
//! pick an implementation by name through `ProviderRegistry`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::evaluation::rules::ApiCredentials;
use crate::evaluation::synthesizer::PromptPair;
use crate::llm_client::LlmError;

pub mod chat;
pub mod registry;
#[cfg(test)]
pub mod scripted;

pub use registry::ProviderRegistry;

// ────────────────────────────────────────────────────────────────────────────
// Call configuration
// ────────────────────────────────────────────────────────────────────────────

/// Everything a provider needs to place one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
}

/// Optional per-request overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationOptions {
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

/// Which pipeline is calling. OpenAI's default model differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    RuleBased,
    FreeForm,
}

/// How a provider is asked for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredMode {
    /// Native `json_schema` response format; the schema is enforced server-side.
    JsonSchema,
    /// `json_object` response format; the schema travels in the user prompt.
    JsonObject,
}

/// Static endpoint table for the known vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    DeepSeek,
    Qwen,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAi, ProviderKind::DeepSeek, ProviderKind::Qwen];

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Qwen => "qwen",
        }
    }

    /// Case-insensitive lookup; unrecognised names resolve to the openai entry.
    pub fn lookup(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or(ProviderKind::OpenAi)
    }

    pub fn base_url(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::DeepSeek => "https://api.deepseek.com",
            ProviderKind::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
        }
    }

    pub fn default_model(self, pipeline: Pipeline) -> &'static str {
        match (self, pipeline) {
            (ProviderKind::OpenAi, Pipeline::RuleBased) => "gpt-5",
            (ProviderKind::OpenAi, Pipeline::FreeForm) => "gpt-4o-mini",
            (ProviderKind::DeepSeek, _) => "deepseek-chat",
            (ProviderKind::Qwen, _) => "qwen-max-latest",
        }
    }

    pub fn structured_mode(self) -> StructuredMode {
        match self {
            ProviderKind::OpenAi => StructuredMode::JsonSchema,
            ProviderKind::DeepSeek | ProviderKind::Qwen => StructuredMode::JsonObject,
        }
    }
}

/// Builds the call configuration from stored credentials and request options.
/// An explicit temperature of `0` is honoured.
pub fn resolve_config(
    credentials: &ApiCredentials,
    options: &EvaluationOptions,
    pipeline: Pipeline,
    default_temperature: f64,
) -> ProviderConfig {
    let kind = ProviderKind::lookup(&credentials.provider);
    ProviderConfig {
        api_key: credentials.key.clone(),
        base_url: kind.base_url().to_string(),
        model: options
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| kind.default_model(pipeline).to_string()),
        temperature: options.temperature.unwrap_or(default_temperature),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Capability trait
// ────────────────────────────────────────────────────────────────────────────

/// One structured call: the prompts for a rule and the schema its answer must follow.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    pub rule_id: &'a str,
    pub prompts: &'a PromptPair,
    pub schema: &'a Value,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    Unknown(String),
}

/// The provider trait. Implement this to add a vendor without touching the
/// orchestrator, the free-form pipeline, or the handlers.
///
/// Carried in `ProviderRegistry` as `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the model's answer as a JSON object. Conformance to
    /// `request.schema` is checked by the caller.
    async fn evaluate_structured(
        &self,
        request: StructuredRequest<'_>,
        config: &ProviderConfig,
    ) -> Result<Value, LlmError>;

    async fn generate_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        config: &ProviderConfig,
    ) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(provider: &str) -> ApiCredentials {
        ApiCredentials {
            provider: provider.to_string(),
            key: "sk-test".to_string(),
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(ProviderKind::lookup("DeepSeek"), ProviderKind::DeepSeek);
        assert_eq!(ProviderKind::lookup(" qwen "), ProviderKind::Qwen);
    }

    #[test]
    fn test_unknown_name_falls_back_to_openai_entry() {
        let config = resolve_config(
            &credentials("mistral"),
            &EvaluationOptions::default(),
            Pipeline::RuleBased,
            0.3,
        );
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-5");
    }

    #[test]
    fn test_default_model_depends_on_pipeline() {
        let rule_based = resolve_config(
            &credentials("openai"),
            &EvaluationOptions::default(),
            Pipeline::RuleBased,
            0.3,
        );
        let free_form = resolve_config(
            &credentials("openai"),
            &EvaluationOptions::default(),
            Pipeline::FreeForm,
            0.3,
        );
        assert_eq!(rule_based.model, "gpt-5");
        assert_eq!(free_form.model, "gpt-4o-mini");

        let qwen = resolve_config(
            &credentials("qwen"),
            &EvaluationOptions::default(),
            Pipeline::FreeForm,
            0.3,
        );
        assert_eq!(qwen.model, "qwen-max-latest");
        assert_eq!(
            qwen.base_url,
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );
    }

    #[test]
    fn test_options_override_model_and_temperature() {
        let options = EvaluationOptions {
            model: Some("deepseek-reasoner".to_string()),
            temperature: Some(0.0),
        };
        let config = resolve_config(&credentials("deepseek"), &options, Pipeline::RuleBased, 0.3);
        assert_eq!(config.model, "deepseek-reasoner");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.base_url, "https://api.deepseek.com");
        assert_eq!(config.api_key, "sk-test");
    }

    #[test]
    fn test_structured_mode_per_vendor() {
        assert_eq!(ProviderKind::OpenAi.structured_mode(), StructuredMode::JsonSchema);
        assert_eq!(ProviderKind::Qwen.structured_mode(), StructuredMode::JsonObject);
    }
}
