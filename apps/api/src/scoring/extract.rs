//! Model-percentage extraction: pluggable strategies that read the model's self-reported
//! match percentage out of its response text.
//!
//! Default: `PatternExtractor` (the `Match Percentage: NN%` phrase).
//! Alternative: `JsonExtractor` (`{"match_percentage": NN}` structured output).
//!
//! `AppState` holds an `Arc<dyn PercentageExtractor>`, chosen at startup via
//! `EXTRACTION_STRATEGY`.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;

use crate::llm_client::strip_json_fences;

/// Reads a percentage out of model output. `None` means the output did not state one,
/// which callers must keep distinct from an explicit 0%.
pub trait PercentageExtractor: Send + Sync {
    /// Short label reported alongside scores, e.g. "pattern".
    fn name(&self) -> &'static str;

    fn extract(&self, text: &str) -> Option<u64>;

    /// Instruction appended to the match prompt so the model emits what `extract` reads.
    fn format_instruction(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// PatternExtractor
// ────────────────────────────────────────────────────────────────────────────

static MATCH_PERCENTAGE_RE: OnceLock<Regex> = OnceLock::new();

/// Finds the first `Match Percentage:` phrase (case-sensitive, any whitespace after the
/// colon) directly followed by digits and `%`. Later occurrences are ignored.
pub struct PatternExtractor;

impl PercentageExtractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, text: &str) -> Option<u64> {
        let re = MATCH_PERCENTAGE_RE
            .get_or_init(|| Regex::new(r"Match Percentage:\s*([0-9]+)%").expect("percentage regex"));
        let digits = re.captures(text)?.get(1)?.as_str();
        // Digits only, so parsing fails only on overflow.
        Some(digits.parse::<u64>().unwrap_or(u64::MAX))
    }

    fn format_instruction(&self) -> &'static str {
        "State the overall match on its own line exactly as `Match Percentage: NN%`."
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JsonExtractor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StructuredMatch {
    match_percentage: u64,
}

/// Reads `{"match_percentage": N}` from a response that is entirely one JSON object,
/// optionally wrapped in markdown code fences. Anything else yields `None`.
pub struct JsonExtractor;

impl PercentageExtractor for JsonExtractor {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extract(&self, text: &str) -> Option<u64> {
        serde_json::from_str::<StructuredMatch>(strip_json_fences(text))
            .ok()
            .map(|m| m.match_percentage)
    }

    fn format_instruction(&self) -> &'static str {
        "Respond with a single JSON object of the form \
        {\"match_percentage\": <integer 0-100>, \"missing_keywords\": [<string>], \
        \"final_assessment\": <string>}. Do NOT include any text outside the JSON object."
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionStrategy {
    #[default]
    Pattern,
    Json,
}

impl ExtractionStrategy {
    pub fn build(self) -> Arc<dyn PercentageExtractor> {
        match self {
            ExtractionStrategy::Pattern => Arc::new(PatternExtractor),
            ExtractionStrategy::Json => Arc::new(JsonExtractor),
        }
    }
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(ExtractionStrategy::Pattern),
            "json" => Ok(ExtractionStrategy::Json),
            other => Err(format!(
                "unknown extraction strategy '{other}' (expected 'pattern' or 'json')"
            )),
        }
    }
}

/// The match percentage stated in `text`, or 0 when none is stated.
pub fn extract_percentage(text: &str) -> u64 {
    PatternExtractor.extract(text).unwrap_or(0)
}
