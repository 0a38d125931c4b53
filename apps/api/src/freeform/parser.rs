//! Free-form response parser.
//!
//! Turns one unstructured model answer into a total score plus a list of
//! `{item, score, reason}` aspects. It never fails; it walks down a ladder:
//!
//! 1. JSON: a response starting with `{` or `[` that parses to an object with
//!    a numeric `totalScore` and a `reasons` array of well-formed aspects is
//!    returned as-is. Any other JSON falls through to the text tiers.
//! 2. Labelled text: `total score: N` plus a `reasons: [ ... ]` block split on
//!    `item:` labels, each segment read for `item`, `score`, `reason`.
//! 3. Fallback: no aspects found → the first number in the response becomes
//!    the total and the whole response becomes one "Overall Evaluation" aspect.
//! 4. Parse error: malformed JSON (or a pattern that will not compile) →
//!    total 0 and one "Parse Error" aspect quoting the first 200 characters.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

pub const OVERALL_EVALUATION_ITEM: &str = "Overall Evaluation";
pub const PARSE_ERROR_ITEM: &str = "Parse Error";
const PARSE_ERROR_EXCERPT_CHARS: usize = 200;

/// Parser output. Aspects stay raw JSON so a JSON answer keeps any extra
/// fields it carries; `summary::validate` turns this into typed data.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvaluation {
    pub total_score: f64,
    pub reasons: Vec<Value>,
}

#[derive(Debug, Error)]
enum ParseFailure {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pattern failed to compile: {0}")]
    Pattern(String),
}

struct Patterns {
    total_score: Regex,
    reasons_block: Regex,
    item_label: Regex,
    score_label: Regex,
    score_value: Regex,
    reason_label: Regex,
    number: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            total_score: Regex::new(r"(?i)total\s+score\s*:\s*(\d+(?:\.\d+)?)")?,
            reasons_block: Regex::new(r"(?is)reasons\s*:\s*\[(.*?)\]")?,
            item_label: Regex::new(r"(?i)item\s*:")?,
            score_label: Regex::new(r"(?i)score\s*:")?,
            score_value: Regex::new(r"(?i)score\s*:\s*(\d+(?:\.\d+)?)")?,
            reason_label: Regex::new(r"(?i)reason\s*:")?,
            number: Regex::new(r"\d+(?:\.\d+)?")?,
        })
    }
}

static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();

fn patterns() -> Result<&'static Patterns, ParseFailure> {
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(|e| ParseFailure::Pattern(e.to_string()))
}

/// Parses a free-form evaluation answer. Never fails.
pub fn parse_response(raw: &str) -> ParsedEvaluation {
    match try_parse(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse evaluation response: {e}");
            parse_error_result(raw)
        }
    }
}

fn try_parse(raw: &str) -> Result<ParsedEvaluation, ParseFailure> {
    let trimmed = raw.trim();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let value: Value = serde_json::from_str(trimmed)?;
        if let Some(parsed) = from_json(&value) {
            return Ok(parsed);
        }
    }

    let patterns = patterns()?;

    let mut total_score = patterns
        .total_score
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_number(m.as_str()))
        .unwrap_or(0.0);

    let reasons = patterns
        .reasons_block
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|block| extract_aspects(patterns, block.as_str()))
        .unwrap_or_default();

    if !reasons.is_empty() {
        return Ok(ParsedEvaluation {
            total_score,
            reasons,
        });
    }

    warn!("Could not parse structured response, falling back to basic extraction");
    if let Some(first) = patterns
        .number
        .find(raw)
        .and_then(|m| parse_number(m.as_str()))
    {
        total_score = first;
    }

    Ok(ParsedEvaluation {
        total_score,
        reasons: vec![aspect(OVERALL_EVALUATION_ITEM, total_score, trimmed)],
    })
}

fn from_json(value: &Value) -> Option<ParsedEvaluation> {
    let total_score = value.get("totalScore")?.as_f64()?;
    let reasons = value.get("reasons")?.as_array()?;
    if !reasons.iter().all(is_aspect) {
        return None;
    }
    Some(ParsedEvaluation {
        total_score,
        reasons: reasons.clone(),
    })
}

fn is_aspect(value: &Value) -> bool {
    value.get("item").is_some_and(Value::is_string)
        && value.get("score").is_some_and(Value::is_number)
        && value.get("reason").is_some_and(Value::is_string)
}

/// Splits the `reasons: [...]` body at each `item:` label and reads the
/// three fields out of every segment. Incomplete segments are skipped.
fn extract_aspects(patterns: &Patterns, block: &str) -> Vec<Value> {
    let starts: Vec<usize> = patterns
        .item_label
        .find_iter(block)
        .map(|m| m.start())
        .collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(block.len());
            read_segment(patterns, &block[start..end])
        })
        .collect()
}

fn read_segment(patterns: &Patterns, segment: &str) -> Option<Value> {
    let label = patterns.item_label.find(segment)?;
    let after_label = &segment[label.end()..];
    let item_end = patterns
        .score_label
        .find(after_label)
        .map(|m| m.start())
        .unwrap_or(after_label.len());
    let item = clean(&after_label[..item_end]);

    let score = parse_number(patterns.score_value.captures(segment)?.get(1)?.as_str())?;

    let reason_label = patterns.reason_label.find(segment)?;
    let reason = clean(&segment[reason_label.end()..]);

    if item.is_empty() || reason.is_empty() {
        return None;
    }
    Some(aspect(item, score, reason))
}

/// Digit runs too long for an `f64` parse to infinity and are ignored.
fn parse_number(digits: &str) -> Option<f64> {
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Trims whitespace and the punctuation models wrap fields in.
fn clean(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '"' | '\'' | '{' | '}'))
}

fn aspect(item: &str, score: f64, reason: &str) -> Value {
    json!({ "item": item, "score": score, "reason": reason })
}

fn parse_error_result(raw: &str) -> ParsedEvaluation {
    let excerpt: String = raw.chars().take(PARSE_ERROR_EXCERPT_CHARS).collect();
    ParsedEvaluation {
        total_score: 0.0,
        reasons: vec![aspect(PARSE_ERROR_ITEM, 0.0, &format!("{excerpt}..."))],
    }
}
