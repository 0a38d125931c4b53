use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::parser::ParsedEvaluation;

/// One scored aspect of a free-form evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationAspect {
    pub item: String,
    pub score: f64,
    pub reason: String,
}

/// A parsed evaluation whose aspects all have the expected shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeformEvaluation {
    pub total_score: f64,
    pub reasons: Vec<EvaluationAspect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub average_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub aspect_count: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidEvaluation {
    #[error("total score is not a finite number")]
    TotalScore,

    #[error("aspect {index} is not an {{item, score, reason}} object")]
    Aspect { index: usize },
}

pub fn validate(parsed: &ParsedEvaluation) -> Result<FreeformEvaluation, InvalidEvaluation> {
    if !parsed.total_score.is_finite() {
        return Err(InvalidEvaluation::TotalScore);
    }

    let reasons = parsed
        .reasons
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let item = value.get("item").and_then(|v| v.as_str());
            let score = value.get("score").and_then(|v| v.as_f64());
            let reason = value.get("reason").and_then(|v| v.as_str());
            match (item, score, reason) {
                (Some(item), Some(score), Some(reason)) => Ok(EvaluationAspect {
                    item: item.to_string(),
                    score,
                    reason: reason.to_string(),
                }),
                _ => Err(InvalidEvaluation::Aspect { index }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FreeformEvaluation {
        total_score: parsed.total_score,
        reasons,
    })
}

pub fn summarize(evaluation: &FreeformEvaluation) -> EvaluationSummary {
    let scores: Vec<f64> = evaluation.reasons.iter().map(|a| a.score).collect();
    if scores.is_empty() {
        return EvaluationSummary {
            average_score: 0.0,
            max_score: 0.0,
            min_score: 0.0,
            aspect_count: 0,
        };
    }

    let sum: f64 = scores.iter().sum();
    EvaluationSummary {
        average_score: sum / scores.len() as f64,
        max_score: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_score: scores.iter().copied().fold(f64::INFINITY, f64::min),
        aspect_count: scores.len(),
    }
}
