// Hybrid match scoring: text normalization, keyword overlap, model-percentage extraction,
// and the 70/30 blend. Pure and synchronous; safe to call from any handler.

pub mod extract;
pub mod hybrid;
pub mod normalize;
pub mod overlap;

pub use extract::{extract_percentage, ExtractionStrategy, PercentageExtractor};
pub use hybrid::{hybrid_score, score_breakdown, ScoreBreakdown};
pub use overlap::{keyword_breakdown, keyword_match, KeywordBreakdown};
