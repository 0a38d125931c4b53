//! Score Reducer: folds per-rule results into one final score.
//!
//! Algorithm:
//! 1. Partition results into blacklist and rating results.
//! 2. Any DISQUALIFIED blacklist result → score 0, disqualified, ratings ignored.
//! 3. final = Σ(score × weight) / Σ(weight) over ratings carrying a weight, 0 if Σ(weight) = 0
//! 4. percentage = final / scale.max × 100
//! 5. Round final and percentage to 2 decimals.

use serde::Serialize;

use crate::evaluation::rules::{RatingScale, SingleRuleResult, Verdict};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist_results: Option<Vec<SingleRuleResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_results: Option<Vec<SingleRuleResult>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScoreResult {
    pub final_score: f64,
    pub is_disqualified: bool,
    pub max_possible_score: f64,
    pub percentage: f64,
    pub breakdown: ScoreBreakdown,
}

/// Reduces rule results to a final score. `scale` must be the scale the
/// rating prompts advertised for this run.
///
/// No ratings and no disqualification yields 0 / 0% without being
/// disqualified; callers must not read that as a worst-case score.
pub fn reduce(results: &[SingleRuleResult], scale: RatingScale) -> FinalScoreResult {
    let (blacklist_results, rating_results): (Vec<SingleRuleResult>, Vec<SingleRuleResult>) =
        results
            .iter()
            .cloned()
            .partition(|r| matches!(r.verdict, Verdict::Blacklist { .. }));

    if blacklist_results.iter().any(SingleRuleResult::is_disqualified) {
        return FinalScoreResult {
            final_score: 0.0,
            is_disqualified: true,
            max_possible_score: 0.0,
            percentage: 0.0,
            breakdown: ScoreBreakdown {
                blacklist_results: Some(blacklist_results),
                rating_results: None,
            },
        };
    }

    let mut weighted_score = 0.0_f64;
    let mut total_weight = 0.0_f64;
    for result in &rating_results {
        if let Verdict::Rating {
            evaluation_score,
            weight: Some(weight),
        } = result.verdict
        {
            weighted_score += evaluation_score * weight;
            total_weight += weight;
        }
    }

    let final_score = if total_weight > 0.0 {
        weighted_score / total_weight
    } else {
        0.0
    };
    let percentage = final_score / scale.max() * 100.0;

    FinalScoreResult {
        final_score: round2(final_score),
        is_disqualified: false,
        max_possible_score: scale.max(),
        percentage: round2(percentage),
        breakdown: ScoreBreakdown {
            blacklist_results: None,
            rating_results: Some(rating_results),
        },
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
