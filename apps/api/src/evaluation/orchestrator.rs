//! Rule Evaluation Orchestrator: fans a rule set out to the provider, one
//! call per rule, all in flight at once, and joins the answers back in rule
//! order.
//!
//! The join waits for every call. If any call fails the whole batch fails
//! with the first failing rule (in rule order); answers from the other calls
//! are discarded. There is no partial-result mode and no retry.

use std::time::Instant;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::evaluation::context::EvaluationContext;
use crate::evaluation::rules::{RatingScale, Rule, SingleRuleResult};
use crate::evaluation::schema::{decode_rule_result, response_schema, SchemaError};
use crate::evaluation::synthesizer::synthesize;
use crate::llm_client::LlmError;
use crate::providers::{Provider, ProviderConfig, StructuredRequest};

#[derive(Debug, Error)]
pub enum RuleFailure {
    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A batch failure, naming the rule that caused it.
#[derive(Debug, Error)]
#[error("rule '{rule_id}' failed: {source}")]
pub struct EvaluationError {
    pub rule_id: String,
    #[source]
    pub source: RuleFailure,
}

/// Evaluates every rule concurrently. `results[i]` always answers `rules[i]`.
///
/// An empty rule set is a successful no-op.
pub async fn evaluate_all(
    provider: &dyn Provider,
    rules: &[Rule],
    context: &EvaluationContext,
    config: &ProviderConfig,
    scale: RatingScale,
) -> Result<Vec<SingleRuleResult>, EvaluationError> {
    if rules.is_empty() {
        return Ok(Vec::new());
    }

    info!(
        run_id = %context.run_id,
        "Starting parallel evaluation of {} rules with {} ({})",
        rules.len(),
        provider.name(),
        config.model
    );
    let started = Instant::now();

    let calls = rules
        .iter()
        .map(|rule| evaluate_rule(provider, rule, context, config, scale));
    let outcomes = join_all(calls).await;

    let results = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

    info!(
        run_id = %context.run_id,
        "All {} rule evaluations completed in {}ms",
        results.len(),
        started.elapsed().as_millis()
    );
    Ok(results)
}

async fn evaluate_rule(
    provider: &dyn Provider,
    rule: &Rule,
    context: &EvaluationContext,
    config: &ProviderConfig,
    scale: RatingScale,
) -> Result<SingleRuleResult, EvaluationError> {
    let prompts = synthesize(rule, context, scale);
    let schema = response_schema(rule, scale);
    let request = StructuredRequest {
        rule_id: rule.id(),
        prompts: &prompts,
        schema: &schema,
    };

    let outcome = match provider.evaluate_structured(request, config).await {
        Ok(value) => decode_rule_result(rule, value, scale).map_err(RuleFailure::from),
        Err(e) => Err(RuleFailure::from(e)),
    };

    outcome.map_err(|source| {
        warn!(run_id = %context.run_id, "Rule {} failed: {source}", rule.id());
        EvaluationError {
            rule_id: rule.id().to_string(),
            source,
        }
    })
}
