//! Response contract for a single rule call: the JSON schema sent to the
//! provider, and strict decoding of whatever comes back.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::evaluation::rules::{RatingScale, Rule, RuleType, SingleRuleResult, Verdict};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("response does not match the {expected} contract: {source}")]
    Malformed {
        expected: RuleType,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected rule_type {expected}, model returned {found}")]
    TypeMismatch { expected: RuleType, found: RuleType },

    #[error("evaluation_score {score} is outside the 0-{max} scale")]
    ScoreOutOfRange { score: f64, max: f64 },
}

/// JSON schema describing a `SingleRuleResult` for the rule's kind.
///
/// Written in the strict structured-output dialect: every property required,
/// no additional properties.
pub fn response_schema(rule: &Rule, scale: RatingScale) -> Value {
    match rule.rule_type() {
        RuleType::Blacklist => json!({
            "type": "object",
            "properties": {
                "rule_id": {
                    "type": "string",
                    "description": "The ID of the rule being evaluated"
                },
                "rule_type": {
                    "type": "string",
                    "enum": ["BLACKLIST"],
                    "description": "The type of rule"
                },
                "dimension_summary": {
                    "type": "string",
                    "description": "Brief summary of what this blacklist rule evaluates"
                },
                "qualification_check": {
                    "type": "string",
                    "enum": ["DISQUALIFIED", "PASSED"],
                    "description": "DISQUALIFIED if the candidate matches the blacklist, PASSED otherwise"
                },
                "reasoning": {
                    "type": "string",
                    "description": "Why the candidate was or wasn't disqualified"
                }
            },
            "required": ["rule_id", "rule_type", "dimension_summary", "qualification_check", "reasoning"],
            "additionalProperties": false
        }),
        RuleType::Rating => json!({
            "type": "object",
            "properties": {
                "rule_id": {
                    "type": "string",
                    "description": "The ID of the rule being evaluated"
                },
                "rule_type": {
                    "type": "string",
                    "enum": ["RATING"],
                    "description": "The type of rule"
                },
                "dimension_summary": {
                    "type": "string",
                    "description": "Brief summary of what this rule evaluates"
                },
                "evaluation_score": {
                    "type": "number",
                    "description": format!("Score from {} for this evaluation criterion", scale.label())
                },
                "reasoning": {
                    "type": "string",
                    "description": "Detailed explanation of the score given"
                }
            },
            "required": ["rule_id", "rule_type", "dimension_summary", "evaluation_score", "reasoning"],
            "additionalProperties": false
        }),
    }
}

/// Decodes a provider answer for `rule` into a `SingleRuleResult`.
///
/// All contract fields must be present and typed. The kind must match the
/// rule, rating scores must sit on the scale, and the rating weight always
/// comes from the rule rather than the model.
pub fn decode_rule_result(
    rule: &Rule,
    value: Value,
    scale: RatingScale,
) -> Result<SingleRuleResult, SchemaError> {
    let expected = rule.rule_type();
    let mut result: SingleRuleResult =
        serde_json::from_value(value).map_err(|source| SchemaError::Malformed { expected, source })?;

    let found = result.rule_type();
    if found != expected {
        return Err(SchemaError::TypeMismatch { expected, found });
    }

    if result.rule_id != rule.id() {
        warn!(
            "Model answered rule '{}' with rule_id '{}'; keeping the requested id",
            rule.id(),
            result.rule_id
        );
        result.rule_id = rule.id().to_string();
    }

    if let (
        Verdict::Rating {
            evaluation_score,
            weight,
        },
        Rule::Evaluation {
            weight: rule_weight,
            ..
        },
    ) = (&mut result.verdict, rule)
    {
        if !(0.0..=scale.max()).contains(&*evaluation_score) {
            return Err(SchemaError::ScoreOutOfRange {
                score: *evaluation_score,
                max: scale.max(),
            });
        }
        *weight = Some(*rule_weight);
    }

    Ok(result)
}
