//! Scripted provider for tests: canned answers per rule id, optional latency,
//! and a record of the order in which calls finished.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm_client::LlmError;
use crate::providers::{Provider, ProviderConfig, StructuredRequest};

struct Scripted {
    delay: Duration,
    reply: Result<Value, String>,
}

#[derive(Default)]
pub struct ScriptedProvider {
    replies: HashMap<String, Scripted>,
    text: Option<Result<String, String>>,
    completed: Mutex<Vec<String>>,
    seen_configs: Mutex<Vec<ProviderConfig>>,
    seen_prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, rule_id: &str, value: Value) -> Self {
        self.answer_after(rule_id, 0, value)
    }

    pub fn answer_after(mut self, rule_id: &str, delay_ms: u64, value: Value) -> Self {
        self.replies.insert(
            rule_id.to_string(),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                reply: Ok(value),
            },
        );
        self
    }

    pub fn fail_after(mut self, rule_id: &str, delay_ms: u64, message: &str) -> Self {
        self.replies.insert(
            rule_id.to_string(),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                reply: Err(message.to_string()),
            },
        );
        self
    }

    pub fn text(mut self, reply: &str) -> Self {
        self.text = Some(Ok(reply.to_string()));
        self
    }

    pub fn fail_text(mut self, message: &str) -> Self {
        self.text = Some(Err(message.to_string()));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Rule ids in the order their calls finished, failures included.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn seen_configs(&self) -> Vec<ProviderConfig> {
        self.seen_configs.lock().unwrap().clone()
    }

    /// `(system, user)` prompt pairs, in call order.
    pub fn seen_prompts(&self) -> Vec<(String, String)> {
        self.seen_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn evaluate_structured(
        &self,
        request: StructuredRequest<'_>,
        config: &ProviderConfig,
    ) -> Result<Value, LlmError> {
        self.seen_configs.lock().unwrap().push(config.clone());
        self.seen_prompts
            .lock()
            .unwrap()
            .push((request.prompts.system.clone(), request.prompts.user.clone()));

        let Some(scripted) = self.replies.get(request.rule_id) else {
            return Err(LlmError::Api {
                status: 404,
                message: format!("no scripted reply for {}", request.rule_id),
            });
        };

        tokio::time::sleep(scripted.delay).await;
        self.completed
            .lock()
            .unwrap()
            .push(request.rule_id.to_string());

        scripted.reply.clone().map_err(|message| LlmError::Api {
            status: 500,
            message,
        })
    }

    async fn generate_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        config: &ProviderConfig,
    ) -> Result<String, LlmError> {
        self.seen_configs.lock().unwrap().push(config.clone());
        self.seen_prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        match &self.text {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(LlmError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}

pub fn rating_answer(rule_id: &str, score: f64) -> Value {
    json!({
        "rule_id": rule_id,
        "rule_type": "RATING",
        "dimension_summary": format!("summary of {rule_id}"),
        "evaluation_score": score,
        "reasoning": format!("reasoning for {rule_id}")
    })
}

pub fn blacklist_answer(rule_id: &str, check: &str) -> Value {
    json!({
        "rule_id": rule_id,
        "rule_type": "BLACKLIST",
        "dimension_summary": format!("summary of {rule_id}"),
        "qualification_check": check,
        "reasoning": format!("reasoning for {rule_id}")
    })
}
