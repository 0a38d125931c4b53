//! Free-form evaluation: the user supplies raw system and user prompts, the
//! provider answers in prose, and the parser recovers a score and aspects.

pub mod handlers;
pub mod parser;
pub mod summary;

use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::llm_client::prompts::fill_template;
use crate::llm_client::LlmError;
use crate::providers::{Provider, ProviderConfig};

use parser::{parse_response, ParsedEvaluation};

#[derive(Debug, Error)]
pub enum FreeformError {
    #[error(transparent)]
    Provider(#[from] LlmError),
}

/// Substitutes the resume and job description into a user prompt template.
/// Both `{jobDescription}` and `{job_description}` spellings are accepted.
pub fn populate_user_prompt(template: &str, resume: &str, job_description: &str) -> String {
    fill_template(
        template,
        &[
            ("resume", resume),
            ("jobDescription", job_description),
            ("job_description", job_description),
        ],
    )
}

/// One text call, then the tiered parse. Only transport and API failures
/// are errors; anything the model writes parses to something.
pub async fn evaluate_with_prompts(
    provider: &dyn Provider,
    system_prompt: &str,
    user_prompt_template: &str,
    resume: &str,
    job_description: &str,
    config: &ProviderConfig,
) -> Result<ParsedEvaluation, FreeformError> {
    let start = Instant::now();
    let user_prompt = populate_user_prompt(user_prompt_template, resume, job_description);

    info!(
        "Starting free-form evaluation with {} ({})",
        provider.name(),
        config.model
    );
    let raw = provider
        .generate_text(system_prompt, &user_prompt, config)
        .await?;
    let parsed = parse_response(&raw);

    info!(
        "Free-form evaluation completed in {}ms ({} aspects)",
        start.elapsed().as_millis(),
        parsed.reasons.len()
    );
    Ok(parsed)
}
