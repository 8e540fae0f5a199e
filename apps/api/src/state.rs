use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Evaluator;
use crate::scoring::PercentageExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. `LlmClient` in production, a stub in tests.
    pub evaluator: Arc<dyn Evaluator>,
    /// Pluggable percentage extractor. Default: PatternExtractor. Swap via EXTRACTION_STRATEGY.
    pub extractor: Arc<dyn PercentageExtractor>,
    pub config: Config,
}
