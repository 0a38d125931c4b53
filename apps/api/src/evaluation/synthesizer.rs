//! Prompt Synthesizer: turns one rule plus the run context into the system
//! and user prompts for that rule's provider call. Pure and deterministic.

use crate::evaluation::context::EvaluationContext;
use crate::evaluation::prompts::{
    BLACKLIST_SYSTEM, BLACKLIST_USER_TEMPLATE, NOT_PROVIDED, RATING_SYSTEM_TEMPLATE,
    RATING_USER_TEMPLATE,
};
use crate::evaluation::rules::{RatingScale, Rule};
use crate::llm_client::prompts::fill_template;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds the prompts for `rule`. `scale` must be the same scale the reducer
/// is given for this run.
pub fn synthesize(rule: &Rule, context: &EvaluationContext, scale: RatingScale) -> PromptPair {
    let job_description = or_not_provided(&context.job_description);
    let resume = or_not_provided(&context.resume);
    let rule_id = rule.id();
    let rule_description = rule.description();

    match rule {
        Rule::Blacklist { dimension, .. } => {
            let dimension = dimension.to_string();
            PromptPair {
                system: BLACKLIST_SYSTEM.to_string(),
                user: fill_template(
                    BLACKLIST_USER_TEMPLATE,
                    &[
                        ("rule_id", rule_id),
                        ("rule_description", rule_description),
                        ("dimension", &dimension),
                        ("job_description", job_description),
                        ("resume", resume),
                    ],
                ),
            }
        }
        Rule::Evaluation { weight, .. } => {
            let weight = weight.to_string();
            PromptPair {
                system: fill_template(
                    RATING_SYSTEM_TEMPLATE,
                    &[("scale", scale.label()), ("scale_guide", &scale_guide(scale))],
                ),
                user: fill_template(
                    RATING_USER_TEMPLATE,
                    &[
                        ("rule_id", rule_id),
                        ("rule_description", rule_description),
                        ("scale", scale.label()),
                        ("weight", &weight),
                        ("job_description", job_description),
                        ("resume", resume),
                    ],
                ),
            }
        }
    }
}

fn scale_guide(scale: RatingScale) -> String {
    scale
        .anchors()
        .iter()
        .map(|(score, meaning)| format!("- {score}: {meaning}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_not_provided(text: &str) -> &str {
    if text.trim().is_empty() {
        NOT_PROVIDED
    } else {
        text
    }
}
