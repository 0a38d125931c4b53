//! Axum route handler for rule-based evaluation.

use std::time::Instant;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::context::EvaluationContext;
use crate::evaluation::orchestrator::evaluate_all;
use crate::evaluation::reducer::{reduce, FinalScoreResult};
use crate::evaluation::rules::{ApiCredentials, RulesetRecord, SingleRuleResult};
use crate::providers::{resolve_config, EvaluationOptions, Pipeline};
use crate::routes::ApiSuccess;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Every field is optional at the wire level so a missing one surfaces as
/// its own error code instead of a generic body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub resume: Option<String>,
    pub job_description: Option<String>,
    pub api_config: Option<ApiCredentials>,
    pub rules: Option<RulesetRecord>,
    pub options: Option<EvaluationOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetadata {
    pub provider: String,
    pub model: String,
    pub rules_evaluated: usize,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub run_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationData {
    #[serde(flatten)]
    pub score: FinalScoreResult,
    pub rule_results: Vec<SingleRuleResult>,
    pub metadata: EvaluationMetadata,
}

// ────────────────────────────────────────────────────────────────────────────
// Input checks shared by both evaluation routes
// ────────────────────────────────────────────────────────────────────────────

/// Inputs every evaluation needs, checked in a fixed order:
/// resume, then job description, then credentials.
pub struct RequiredInputs<'a> {
    pub resume: &'a str,
    pub job_description: &'a str,
    pub credentials: &'a ApiCredentials,
}

pub fn require_inputs<'a>(
    resume: Option<&'a str>,
    job_description: Option<&'a str>,
    credentials: Option<&'a ApiCredentials>,
) -> Result<RequiredInputs<'a>, AppError> {
    let resume = non_blank(resume).ok_or(AppError::ResumeMissing)?;
    let job_description = non_blank(job_description).ok_or(AppError::JobDescriptionMissing)?;
    let credentials = credentials
        .filter(|c| c.is_complete())
        .ok_or(AppError::ConfigMissing)?;

    Ok(RequiredInputs {
        resume,
        job_description,
        credentials,
    })
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

pub fn read_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluate
///
/// Converts the ruleset, evaluates every rule in parallel with the chosen
/// provider, and reduces the answers to a final score.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<ApiSuccess<EvaluationData>>, AppError> {
    let started = Instant::now();
    let request = read_body(payload)?;

    let inputs = require_inputs(
        request.resume.as_deref(),
        request.job_description.as_deref(),
        request.api_config.as_ref(),
    )?;
    // Rating rules are mandatory; blacklist checks only ride along with them.
    let ruleset = request
        .rules
        .as_ref()
        .filter(|r| !r.evaluation_rules.is_empty())
        .ok_or(AppError::RulesMissing)?;

    let rules = ruleset.to_rules();
    if rules.is_empty() {
        return Err(AppError::RulesEmpty);
    }
    for warning in ruleset.weight_warnings() {
        warn!("Ruleset weight check: {warning}");
    }

    let options = request.options.unwrap_or_default();
    let config = resolve_config(
        inputs.credentials,
        &options,
        Pipeline::RuleBased,
        state.config.default_temperature,
    );
    let provider = state.providers.get(&inputs.credentials.provider)?;
    let scale = state.config.rating_scale;

    let context = EvaluationContext::new(inputs.resume, inputs.job_description);
    let rule_results = evaluate_all(provider.as_ref(), &rules, &context, &config, scale).await?;
    let score = reduce(&rule_results, scale);

    let execution_time_ms = started.elapsed().as_millis() as u64;
    info!(
        run_id = %context.run_id,
        "Evaluation finished: score {} ({}%), disqualified: {}, {}ms",
        score.final_score,
        score.percentage,
        score.is_disqualified,
        execution_time_ms
    );

    Ok(Json(ApiSuccess::new(EvaluationData {
        score,
        metadata: EvaluationMetadata {
            provider: inputs.credentials.provider.clone(),
            model: config.model,
            rules_evaluated: rule_results.len(),
            timestamp: context.timestamp,
            execution_time_ms,
            run_id: context.run_id,
        },
        rule_results,
    })))
}
