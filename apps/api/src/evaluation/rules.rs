//! Rules, per-rule results, and the ruleset records the browser client stores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Rating scale
// ────────────────────────────────────────────────────────────────────────────

/// The discrete scale rating rules are scored on.
///
/// One value is chosen per run and handed to both the prompt synthesizer and
/// the score reducer, so the scale advertised to the model and the
/// `maxPossibleScore` used for the percentage can never drift apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatingScale {
    /// 0–5, integer steps.
    #[default]
    ZeroToFive,
    /// 0–10, even steps.
    ZeroToTen,
}

impl RatingScale {
    pub fn max(self) -> f64 {
        match self {
            RatingScale::ZeroToFive => 5.0,
            RatingScale::ZeroToTen => 10.0,
        }
    }

    /// Band anchors as `(score, description)`, lowest first.
    pub fn anchors(self) -> &'static [(u8, &'static str)] {
        match self {
            RatingScale::ZeroToFive => &[
                (0, "Very Poor / Not present"),
                (1, "Poor / Minimal evidence"),
                (2, "Below Average / Some evidence"),
                (3, "Average / Adequate evidence"),
                (4, "Good / Strong evidence"),
                (5, "Excellent / Outstanding evidence"),
            ],
            RatingScale::ZeroToTen => &[
                (0, "Very Poor / Not present"),
                (2, "Poor / Minimal evidence"),
                (4, "Below Average / Some evidence"),
                (6, "Average / Adequate evidence"),
                (8, "Good / Strong evidence"),
                (10, "Excellent / Outstanding evidence"),
            ],
        }
    }

    /// Short label used in prompts, e.g. `0-5`.
    pub fn label(self) -> &'static str {
        match self {
            RatingScale::ZeroToFive => "0-5",
            RatingScale::ZeroToTen => "0-10",
        }
    }
}

impl FromStr for RatingScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(RatingScale::ZeroToFive),
            "10" => Ok(RatingScale::ZeroToTen),
            other => Err(format!("rating scale must be 5 or 10, got '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

/// The axis a blacklist rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlacklistDimension {
    Company,
    Education,
}

impl fmt::Display for BlacklistDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlacklistDimension::Company => f.write_str("company"),
            BlacklistDimension::Education => f.write_str("education"),
        }
    }
}

/// A single evaluation criterion handed to the core for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    /// Disqualifying boolean check.
    Blacklist {
        id: String,
        dimension: BlacklistDimension,
        description: String,
    },
    /// Graded criterion. `weight` is expected in [0.1, 1.0] but never enforced here.
    Evaluation {
        id: String,
        description: String,
        weight: f64,
    },
}

impl Rule {
    pub fn id(&self) -> &str {
        match self {
            Rule::Blacklist { id, .. } | Rule::Evaluation { id, .. } => id,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Rule::Blacklist { description, .. } | Rule::Evaluation { description, .. } => {
                description
            }
        }
    }

    pub fn rule_type(&self) -> RuleType {
        match self {
            Rule::Blacklist { .. } => RuleType::Blacklist,
            Rule::Evaluation { .. } => RuleType::Rating,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-rule results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Rating,
    Blacklist,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::Rating => f.write_str("RATING"),
            RuleType::Blacklist => f.write_str("BLACKLIST"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualificationCheck {
    Disqualified,
    Passed,
}

/// Kind-specific half of a rule result. The tag doubles as `rule_type` on the
/// wire, so a result carries exactly one of `qualification_check` or
/// `evaluation_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Blacklist {
        qualification_check: QualificationCheck,
    },
    Rating {
        evaluation_score: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weight: Option<f64>,
    },
}

/// The structured answer for one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleRuleResult {
    pub rule_id: String,
    pub dimension_summary: String,
    pub reasoning: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl SingleRuleResult {
    pub fn rule_type(&self) -> RuleType {
        match self.verdict {
            Verdict::Blacklist { .. } => RuleType::Blacklist,
            Verdict::Rating { .. } => RuleType::Rating,
        }
    }

    pub fn is_disqualified(&self) -> bool {
        matches!(
            self.verdict,
            Verdict::Blacklist {
                qualification_check: QualificationCheck::Disqualified
            }
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client-local records (persistence boundary)
// ────────────────────────────────────────────────────────────────────────────

/// Stored API credentials: `{ provider, key }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCredentials {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub key: String,
}

impl ApiCredentials {
    pub fn is_complete(&self) -> bool {
        !self.provider.trim().is_empty() && !self.key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRuleRecord {
    pub id: String,
    pub description: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlacklistSettings {
    pub company_blacklist_enabled: bool,
    pub company_blacklist: String,
    pub degree_blacklist_enabled: bool,
    pub degree_blacklist: String,
}

/// The rule-based ruleset as the editor saves it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetRecord {
    #[serde(default)]
    pub evaluation_rules: Vec<EvaluationRuleRecord>,
    #[serde(default)]
    pub blacklist: BlacklistSettings,
}

/// Ids assigned to the two blacklist rules derived from the toggles.
pub const COMPANY_BLACKLIST_RULE_ID: &str = "company_blacklist";
pub const DEGREE_BLACKLIST_RULE_ID: &str = "degree_blacklist";

impl RulesetRecord {
    /// Converts the stored record into rules: rating rules first, then the
    /// company and education blacklist checks when enabled and non-empty.
    pub fn to_rules(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self
            .evaluation_rules
            .iter()
            .map(|r| Rule::Evaluation {
                id: r.id.clone(),
                description: r.description.clone(),
                weight: r.weight,
            })
            .collect();

        let blacklist = &self.blacklist;
        if blacklist.company_blacklist_enabled && !blacklist.company_blacklist.trim().is_empty() {
            rules.push(Rule::Blacklist {
                id: COMPANY_BLACKLIST_RULE_ID.to_string(),
                dimension: BlacklistDimension::Company,
                description: format!("Company blacklist check: {}", blacklist.company_blacklist),
            });
        }
        if blacklist.degree_blacklist_enabled && !blacklist.degree_blacklist.trim().is_empty() {
            rules.push(Rule::Blacklist {
                id: DEGREE_BLACKLIST_RULE_ID.to_string(),
                dimension: BlacklistDimension::Education,
                description: format!("Education blacklist check: {}", blacklist.degree_blacklist),
            });
        }

        rules
    }

    /// Weight problems the editor would have flagged. Advisory only: the
    /// reducer's weighted average does not depend on the total.
    pub fn weight_warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .evaluation_rules
            .iter()
            .filter(|r| !(0.1..=1.0).contains(&r.weight))
            .map(|r| format!("rule '{}' weight {} is outside [0.1, 1.0]", r.id, r.weight))
            .collect();

        if !self.evaluation_rules.is_empty() {
            let total: f64 = self.evaluation_rules.iter().map(|r| r.weight).sum();
            let rounded = (total * 10.0).round() / 10.0;
            if (rounded - 1.0).abs() > f64::EPSILON {
                warnings.push(format!("total weight {rounded:.1} does not equal 1.0"));
            }
        }

        warnings
    }
}

/// The free-form ruleset: raw system and user prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptRulesetRecord {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl PromptRulesetRecord {
    pub fn is_complete(&self) -> bool {
        !self.system_prompt.trim().is_empty() && !self.user_prompt.trim().is_empty()
    }
}
