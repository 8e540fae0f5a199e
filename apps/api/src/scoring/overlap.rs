//! Lexical overlap between a job description and a resume.
//!
//! The score is plain Jaccard similarity over deduplicated tokens. Term frequency is
//! discarded entirely; there is no IDF weighting.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::scoring::normalize::normalize;

/// Normalizes `text` and returns its distinct whitespace-delimited tokens.
pub fn token_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Jaccard similarity of the two token sets as a percentage, rounded to 2 decimals.
/// Returns exactly 0.0 when both inputs normalize to nothing.
pub fn keyword_match(job_description: &str, resume_text: &str) -> f64 {
    let job_tokens = token_set(job_description);
    let resume_tokens = token_set(resume_text);

    let union = job_tokens.union(&resume_tokens).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = job_tokens.intersection(&resume_tokens).count();
    round_2dp(intersection as f64 / union as f64 * 100.0)
}

/// Rounds half-to-even on the exact binary value: 3.125 becomes 3.12, not 3.13.
fn round_2dp(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Which job-description tokens the resume covers, and which it does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBreakdown {
    pub matched: Vec<String>, // sorted
    pub missing: Vec<String>, // in the JD, absent from the resume; sorted
    pub union_size: usize,
    pub intersection_size: usize,
    pub keyword_match: f64,
}

/// Computes the token-level breakdown behind `keyword_match`.
pub fn keyword_breakdown(job_description: &str, resume_text: &str) -> KeywordBreakdown {
    let job_tokens = token_set(job_description);
    let resume_tokens = token_set(resume_text);

    let matched: BTreeSet<&String> = job_tokens.intersection(&resume_tokens).collect();
    let missing: BTreeSet<&String> = job_tokens.difference(&resume_tokens).collect();
    let union_size = job_tokens.union(&resume_tokens).count();

    KeywordBreakdown {
        intersection_size: matched.len(),
        union_size,
        keyword_match: keyword_match(job_description, resume_text),
        matched: matched.into_iter().cloned().collect(),
        missing: missing.into_iter().cloned().collect(),
    }
}
