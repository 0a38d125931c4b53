//! `ChatCompletionsProvider`: the provider implementation for every vendor
//! that speaks the OpenAI-compatible chat completions protocol.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::llm_client::prompts::JSON_SCHEMA_INSTRUCTION;
use crate::llm_client::{ChatRequest, LlmClient, LlmError};
use crate::providers::{Provider, ProviderConfig, ProviderKind, StructuredMode, StructuredRequest};

/// OpenAI caps response format names at 64 characters.
const MAX_FORMAT_NAME_LEN: usize = 64;

pub struct ChatCompletionsProvider {
    kind: ProviderKind,
    llm: LlmClient,
}

impl ChatCompletionsProvider {
    pub fn new(kind: ProviderKind, llm: LlmClient) -> Self {
        Self { kind, llm }
    }
}

#[async_trait]
impl Provider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        self.kind.name()
    }

    async fn evaluate_structured(
        &self,
        request: StructuredRequest<'_>,
        config: &ProviderConfig,
    ) -> Result<Value, LlmError> {
        debug!(
            "Starting {} structured call for rule {}",
            self.name(),
            request.rule_id
        );
        let started = Instant::now();

        let value = match self.kind.structured_mode() {
            StructuredMode::JsonSchema => {
                let chat = ChatRequest::new(
                    &config.model,
                    config.temperature,
                    &request.prompts.system,
                    &request.prompts.user,
                )
                .with_response_format(json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": response_format_name(request.rule_id),
                        "strict": true,
                        "schema": request.schema,
                    }
                }));
                self.llm
                    .call_json(&config.base_url, &config.api_key, &chat)
                    .await?
            }
            StructuredMode::JsonObject => {
                let user = schema_in_prompt(&request.prompts.user, request.schema)?;
                let chat = ChatRequest::new(
                    &config.model,
                    config.temperature,
                    &request.prompts.system,
                    &user,
                )
                .with_response_format(json!({ "type": "json_object" }));
                self.llm
                    .call_json(&config.base_url, &config.api_key, &chat)
                    .await?
            }
        };

        info!(
            "Rule {} evaluated by {} in {}ms",
            request.rule_id,
            self.name(),
            started.elapsed().as_millis()
        );
        Ok(value)
    }

    async fn generate_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        config: &ProviderConfig,
    ) -> Result<String, LlmError> {
        debug!("Starting {} text generation", self.name());
        let chat = ChatRequest::new(&config.model, config.temperature, system_prompt, user_prompt);
        let text = self
            .llm
            .call_text(&config.base_url, &config.api_key, &chat)
            .await?;
        debug!("{} text generation returned {} chars", self.name(), text.len());
        Ok(text)
    }
}

/// `single_rule_evaluation_<rule id>` restricted to `[A-Za-z0-9_-]`.
fn response_format_name(rule_id: &str) -> String {
    format!("single_rule_evaluation_{rule_id}")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FORMAT_NAME_LEN)
        .collect()
}

fn schema_in_prompt(user_prompt: &str, schema: &Value) -> Result<String, LlmError> {
    let schema = serde_json::to_string_pretty(schema)?;
    Ok(format!("{user_prompt}\n\n{JSON_SCHEMA_INSTRUCTION}\n{schema}"))
}
