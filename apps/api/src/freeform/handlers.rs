use std::time::Instant;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::evaluation::handlers::{read_body, require_inputs};
use crate::evaluation::rules::{ApiCredentials, PromptRulesetRecord};
use crate::freeform::evaluate_with_prompts;
use crate::freeform::summary::{summarize, validate, EvaluationSummary, FreeformEvaluation};
use crate::providers::{resolve_config, EvaluationOptions, Pipeline};
use crate::routes::ApiSuccess;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeformRequest {
    pub resume: Option<String>,
    pub job_description: Option<String>,
    pub api_config: Option<ApiCredentials>,
    pub prompts: Option<PromptRulesetRecord>,
    pub options: Option<EvaluationOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeformMetadata {
    pub provider: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct FreeformData {
    #[serde(flatten)]
    pub evaluation: FreeformEvaluation,
    pub summary: EvaluationSummary,
    pub metadata: FreeformMetadata,
}

/// POST /api/v1/evaluate-b
///
/// Sends the user's own prompts to the provider once and parses whatever
/// comes back into a total score and scored aspects.
pub async fn handle_evaluate_b(
    State(state): State<AppState>,
    payload: Result<Json<FreeformRequest>, JsonRejection>,
) -> Result<Json<ApiSuccess<FreeformData>>, AppError> {
    let started = Instant::now();
    let timestamp = Utc::now();
    let request = read_body(payload)?;

    let inputs = require_inputs(
        request.resume.as_deref(),
        request.job_description.as_deref(),
        request.api_config.as_ref(),
    )?;
    let prompts = request
        .prompts
        .as_ref()
        .filter(|p| p.is_complete())
        .ok_or(AppError::PromptsMissing)?;

    let options = request.options.unwrap_or_default();
    let config = resolve_config(
        inputs.credentials,
        &options,
        Pipeline::FreeForm,
        state.config.default_temperature,
    );
    let provider = state.providers.get(&inputs.credentials.provider)?;

    let parsed = evaluate_with_prompts(
        provider.as_ref(),
        &prompts.system_prompt,
        &prompts.user_prompt,
        inputs.resume,
        inputs.job_description,
        &config,
    )
    .await?;

    let evaluation = validate(&parsed).map_err(|e| {
        warn!("Free-form result rejected: {e}");
        AppError::InvalidResult
    })?;
    let summary = summarize(&evaluation);

    Ok(Json(ApiSuccess::new(FreeformData {
        evaluation,
        summary,
        metadata: FreeformMetadata {
            provider: inputs.credentials.provider.clone(),
            model: config.model,
            timestamp,
            execution_time_ms: started.elapsed().as_millis() as u64,
        },
    })))
}
