//! Axum route handlers for the Analysis and Scoring API.

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::analysis::pipeline::{
    run_analysis, AnalysisKind, AnalysisOptions, AnalysisReport, AnalysisRequest,
};
use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::scoring::{keyword_breakdown, score_breakdown, KeywordBreakdown, ScoreBreakdown};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub model_response: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub resume_text: String,
}

/// Multipart form fields of `POST /api/v1/analyze`, before validation.
#[derive(Debug, Default)]
struct AnalyzeForm {
    job_description: String,
    resume: Option<ResumeDocument>,
    kind: AnalysisKind,
    include_visualization: Option<bool>,
    include_keyword_breakdown: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart upload: `job_description`, `resume` (PDF), optional `kind`,
/// `include_visualization`, `include_keyword_breakdown`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let form = read_analyze_form(multipart, state.config.max_upload_bytes).await?;

    let resume = form
        .resume
        .ok_or_else(|| AppError::Validation("Please upload your resume first".to_string()))?;

    let defaults = AnalysisOptions::for_kind(form.kind);
    let options = AnalysisOptions {
        include_visualization: form
            .include_visualization
            .unwrap_or(defaults.include_visualization),
        include_keyword_breakdown: form
            .include_keyword_breakdown
            .unwrap_or(defaults.include_keyword_breakdown),
    };

    let report = run_analysis(
        state.evaluator.as_ref(),
        state.extractor.as_ref(),
        AnalysisRequest {
            kind: form.kind,
            job_description: &form.job_description,
            resume: &resume,
            options,
        },
    )
    .await?;

    Ok(Json(report))
}

/// POST /api/v1/score
///
/// Scores an already-obtained model response. No model call, no upload.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreBreakdown> {
    Json(score_breakdown(
        state.extractor.as_ref(),
        &request.model_response,
        &request.job_description,
        &request.resume_text,
    ))
}

/// POST /api/v1/keywords
///
/// Token-level overlap between a job description and resume text.
pub async fn handle_keywords(Json(request): Json<KeywordsRequest>) -> Json<KeywordBreakdown> {
    Json(keyword_breakdown(
        &request.job_description,
        &request.resume_text,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_analyze_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => form.job_description = field_text(field).await?,
            "resume" => {
                let file_name = field.file_name().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))?;
                // An empty file part is how browsers submit "no file chosen"
                if !bytes.is_empty() {
                    form.resume = Some(ResumeDocument::from_upload(
                        bytes,
                        file_name,
                        max_upload_bytes,
                    )?);
                }
            }
            "kind" => {
                let raw = field_text(field).await?;
                form.kind = parse_kind(&raw)?;
            }
            "include_visualization" => {
                form.include_visualization = Some(parse_flag(&name, &field_text(field).await?)?);
            }
            "include_keyword_breakdown" => {
                form.include_keyword_breakdown =
                    Some(parse_flag(&name, &field_text(field).await?)?);
            }
            other => debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    Ok(form)
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read form field: {e}")))
}

fn parse_kind(raw: &str) -> Result<AnalysisKind, AppError> {
    match raw.trim() {
        "" | "evaluation" => Ok(AnalysisKind::Evaluation),
        "improvement" => Ok(AnalysisKind::Improvement),
        "match_percentage" => Ok(AnalysisKind::MatchPercentage),
        other => Err(AppError::Validation(format!(
            "Unknown analysis kind '{other}' (expected evaluation, improvement or match_percentage)"
        ))),
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(AppError::Validation(format!(
            "Field '{name}' must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_defaults_to_evaluation() {
        assert_eq!(parse_kind("").unwrap(), AnalysisKind::Evaluation);
        assert_eq!(parse_kind(" improvement ").unwrap(), AnalysisKind::Improvement);
        assert_eq!(
            parse_kind("match_percentage").unwrap(),
            AnalysisKind::MatchPercentage
        );
        assert!(parse_kind("summary").is_err());
    }

    #[test]
    fn test_parse_flag_accepts_form_spellings() {
        assert!(parse_flag("f", "on").unwrap());
        assert!(parse_flag("f", "TRUE").unwrap());
        assert!(!parse_flag("f", "0").unwrap());
        assert!(parse_flag("f", "maybe").is_err());
    }
}
