use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Read-only inputs shared by every rule evaluation in one run.
///
/// Built once per request and passed by reference into every synthesis call,
/// then dropped with the request. Nothing about a run outlives it.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub run_id: Uuid,
    pub resume: String,
    pub job_description: String,
    pub timestamp: DateTime<Utc>,
}

impl EvaluationContext {
    pub fn new(resume: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            resume: resume.into(),
            job_description: job_description.into(),
            timestamp: Utc::now(),
        }
    }
}
