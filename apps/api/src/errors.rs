use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::evaluation::orchestrator::EvaluationError;
use crate::freeform::FreeformError;
use crate::providers::ProviderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`;
/// every variant renders as `{ "success": false, "error": ..., "code": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Resume content is required")]
    ResumeMissing,

    #[error("Job description is required")]
    JobDescriptionMissing,

    #[error("API configuration is required")]
    ConfigMissing,

    #[error("Evaluation rules are required")]
    RulesMissing,

    #[error("Both system prompt and user prompt are required")]
    PromptsMissing,

    #[error("No valid evaluation rules configured")]
    RulesEmpty,

    #[error("Invalid evaluation result structure")]
    InvalidResult,

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// `action` completes "Use POST to ...", e.g. "evaluate resumes".
    #[error("Method not allowed. Use POST to {action}.")]
    MethodNotAllowed { action: &'static str },

    #[error("Evaluation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Evaluation failed: {0}")]
    Rule(#[from] EvaluationError),

    #[error("Evaluation failed: {0}")]
    Freeform(#[from] FreeformError),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ResumeMissing => "RESUME_MISSING",
            AppError::JobDescriptionMissing => "JOB_DESCRIPTION_MISSING",
            AppError::ConfigMissing => "CONFIG_MISSING",
            AppError::RulesMissing => "RULES_MISSING",
            AppError::PromptsMissing => "PROMPTS_MISSING",
            AppError::RulesEmpty => "RULES_EMPTY",
            AppError::InvalidResult => "INVALID_RESULT",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            AppError::Provider(_) | AppError::Rule(_) | AppError::Freeform(_) => {
                "EVALUATION_FAILED"
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ResumeMissing
            | AppError::JobDescriptionMissing
            | AppError::ConfigMissing
            | AppError::RulesMissing
            | AppError::PromptsMissing
            | AppError::RulesEmpty
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidResult
            | AppError::Provider(_)
            | AppError::Rule(_)
            | AppError::Freeform(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{code}: {message}");
        } else {
            tracing::debug!("Rejected request ({code}): {message}");
        }

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
