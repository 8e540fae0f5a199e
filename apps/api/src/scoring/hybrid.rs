use serde::{Deserialize, Serialize};

use crate::scoring::extract::{extract_percentage, PercentageExtractor};
use crate::scoring::overlap::keyword_match;

/// Blend weights for the model's stated percentage and the local keyword overlap.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub model: f64,
    pub keyword: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            model: 0.7,
            keyword: 0.3,
        }
    }
}

/// Every input that went into a final score, for callers that want to show their work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// `None` when the model response did not state a percentage (scored as 0).
    pub model_percentage: Option<u64>,
    pub keyword_match: f64,
    pub final_score: u32,
    pub extractor: String,
}

/// Weighted blend truncated toward zero and capped at 100.
///
/// Both inputs are non-negative, so only the upper bound needs enforcing.
pub fn combine(model_percentage: u64, keyword_match: f64, weights: &ScoringWeights) -> u32 {
    let weighted = weights.model * model_percentage as f64 + weights.keyword * keyword_match;
    // `as` truncates and saturates; NaN maps to 0
    (weighted as u64).min(100) as u32
}

/// Scores a model response against the job description / resume pair, returning the
/// full breakdown. Uses the default 70/30 weights.
pub fn score_breakdown(
    extractor: &dyn PercentageExtractor,
    model_response: &str,
    job_description: &str,
    resume_text: &str,
) -> ScoreBreakdown {
    let model_percentage = extractor.extract(model_response);
    let keyword_match = keyword_match(job_description, resume_text);
    let final_score = combine(
        model_percentage.unwrap_or(0),
        keyword_match,
        &ScoringWeights::default(),
    );

    ScoreBreakdown {
        model_percentage,
        keyword_match,
        final_score,
        extractor: extractor.name().to_string(),
    }
}

/// 0.7 × the stated match percentage + 0.3 × keyword overlap, truncated, capped at 100.
pub fn hybrid_score(model_response: &str, job_description: &str, resume_text: &str) -> u32 {
    let model_percentage = extract_percentage(model_response);
    let keyword_match = keyword_match(job_description, resume_text);
    combine(model_percentage, keyword_match, &ScoringWeights::default())
}
