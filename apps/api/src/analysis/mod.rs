// Resume analysis: one pipeline for the evaluation, improvement and match-percentage
// reports. All model calls go through llm_client::Evaluator.

pub mod chart;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
