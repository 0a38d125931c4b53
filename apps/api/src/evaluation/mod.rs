//! Rule-based evaluation: one structured provider call per rule, run in
//! parallel, reduced to a weighted score with blacklist disqualification.

pub mod context;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod reducer;
pub mod rules;
pub mod schema;
pub mod synthesizer;
