//! Resume-to-job-description matching: a hybrid score that blends the model's stated
//! match percentage with local keyword overlap, plus the HTTP service around it.

pub mod analysis;
pub mod config;
pub mod document;
pub mod errors;
pub mod llm_client;
pub mod routes;
pub mod scoring;
pub mod state;
