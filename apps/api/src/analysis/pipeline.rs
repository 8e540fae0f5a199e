//! One parameterized pipeline behind every analysis kind:
//! validate → model evaluation → (resume text) → score → keywords → chart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::chart::PieChart;
use crate::analysis::prompts::{EVALUATION_PROMPT, IMPROVEMENT_PROMPT, MATCH_PERCENTAGE_PROMPT};
use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::llm_client::prompts::with_shared_instructions;
use crate::llm_client::Evaluator;
use crate::scoring::{
    keyword_breakdown, score_breakdown, KeywordBreakdown, PercentageExtractor, ScoreBreakdown,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// HR-manager style evaluation of fit, strengths and weaknesses.
    #[default]
    Evaluation,
    /// Career-advisor recommendations: gaps, resources, strategies.
    Improvement,
    /// ATS-style report with a stated match percentage; the only kind that is scored.
    MatchPercentage,
}

impl AnalysisKind {
    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::Evaluation => "Resume Analysis",
            AnalysisKind::Improvement => "Improvement Suggestions",
            AnalysisKind::MatchPercentage => "Analysis Results",
        }
    }

    pub fn is_scored(self) -> bool {
        self == AnalysisKind::MatchPercentage
    }

    /// Full prompt sent to the model. The match prompt carries the extractor's format
    /// instruction so the response contains what the extractor reads.
    pub fn prompt(self, extractor: &dyn PercentageExtractor) -> String {
        match self {
            AnalysisKind::Evaluation => with_shared_instructions(EVALUATION_PROMPT),
            AnalysisKind::Improvement => with_shared_instructions(IMPROVEMENT_PROMPT),
            AnalysisKind::MatchPercentage => with_shared_instructions(&format!(
                "{}\n{}",
                MATCH_PERCENTAGE_PROMPT.trim(),
                extractor.format_instruction()
            )),
        }
    }
}

/// Optional stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub include_visualization: bool,
    pub include_keyword_breakdown: bool,
}

impl AnalysisOptions {
    /// Both stages on for the scored kind, off otherwise.
    pub fn for_kind(kind: AnalysisKind) -> Self {
        Self {
            include_visualization: kind.is_scored(),
            include_keyword_breakdown: kind.is_scored(),
        }
    }
}

pub struct AnalysisRequest<'a> {
    pub kind: AnalysisKind,
    pub job_description: &'a str,
    pub resume: &'a ResumeDocument,
    pub options: AnalysisOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub kind: AnalysisKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub model_response: String,
    pub score: Option<ScoreBreakdown>,
    pub keywords: Option<KeywordBreakdown>,
    pub chart: Option<PieChart>,
}

/// Runs one analysis end to end. The chart is only produced when a score exists.
pub async fn run_analysis(
    evaluator: &dyn Evaluator,
    extractor: &dyn PercentageExtractor,
    request: AnalysisRequest<'_>,
) -> Result<AnalysisReport, AppError> {
    let AnalysisRequest {
        kind,
        job_description,
        resume,
        options,
    } = request;

    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let analysis_id = Uuid::new_v4();
    info!(%analysis_id, ?kind, "Running resume analysis");

    let prompt = kind.prompt(extractor);
    let model_response = evaluator
        .evaluate(job_description, resume.bytes(), &prompt)
        .await?;
    debug!(%analysis_id, "Model response: {} chars", model_response.len());

    let needs_text = kind.is_scored() || options.include_keyword_breakdown;
    let resume_text = if needs_text {
        Some(resume.extract_text().await?)
    } else {
        None
    };

    let report = build_report(
        analysis_id,
        kind,
        options,
        extractor,
        job_description,
        model_response,
        resume_text.as_deref(),
    );

    if let Some(score) = &report.score {
        info!(
            %analysis_id,
            final_score = score.final_score,
            keyword_match = score.keyword_match,
            model_percentage = ?score.model_percentage,
            "Hybrid score computed"
        );
    }

    Ok(report)
}

/// Assembles the report from the model response and, when it was needed, the resume text.
fn build_report(
    analysis_id: Uuid,
    kind: AnalysisKind,
    options: AnalysisOptions,
    extractor: &dyn PercentageExtractor,
    job_description: &str,
    model_response: String,
    resume_text: Option<&str>,
) -> AnalysisReport {
    let score = match resume_text {
        Some(text) if kind.is_scored() => Some(score_breakdown(
            extractor,
            &model_response,
            job_description,
            text,
        )),
        _ => None,
    };

    let keywords = match resume_text {
        Some(text) if options.include_keyword_breakdown => {
            Some(keyword_breakdown(job_description, text))
        }
        _ => None,
    };

    let chart = match &score {
        Some(score) if options.include_visualization => Some(PieChart::for_score(score.final_score)),
        _ => None,
    };

    AnalysisReport {
        analysis_id,
        kind,
        title: kind.title().to_string(),
        generated_at: Utc::now(),
        model_response,
        score,
        keywords,
        chart,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{Evaluator, LlmError};

    /// Returns a canned response and records the prompts it was given.
    pub struct StubEvaluator {
        pub response: Option<String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubEvaluator {
        pub fn replying(response: &str) -> Self {
            Self {
                response: Some(response.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                response: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Evaluator for StubEvaluator {
        async fn evaluate(
            &self,
            _job_description: &str,
            _resume_pdf: &[u8],
            prompt: &str,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response.clone().ok_or(LlmError::EmptyContent)
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::test_support::StubEvaluator;
    use super::*;
    use crate::scoring::extract::{JsonExtractor, PatternExtractor};

    fn resume() -> ResumeDocument {
        ResumeDocument::from_upload(Bytes::from_static(b"%PDF-1.4\n"), None, 1024).unwrap()
    }

    #[test]
    fn test_default_options_follow_kind() {
        assert_eq!(
            AnalysisOptions::for_kind(AnalysisKind::MatchPercentage),
            AnalysisOptions {
                include_visualization: true,
                include_keyword_breakdown: true
            }
        );
        assert_eq!(
            AnalysisOptions::for_kind(AnalysisKind::Evaluation),
            AnalysisOptions {
                include_visualization: false,
                include_keyword_breakdown: false
            }
        );
    }

    #[test]
    fn test_titles() {
        assert_eq!(AnalysisKind::Evaluation.title(), "Resume Analysis");
        assert_eq!(AnalysisKind::Improvement.title(), "Improvement Suggestions");
        assert_eq!(AnalysisKind::MatchPercentage.title(), "Analysis Results");
    }

    #[test]
    fn test_kind_serde_is_snake_case() {
        let kind: AnalysisKind = serde_json::from_str(r#""match_percentage""#).unwrap();
        assert_eq!(kind, AnalysisKind::MatchPercentage);
        assert_eq!(
            serde_json::to_string(&AnalysisKind::Improvement).unwrap(),
            r#""improvement""#
        );
    }

    #[test]
    fn test_match_prompt_carries_format_instruction() {
        let pattern_prompt = AnalysisKind::MatchPercentage.prompt(&PatternExtractor);
        assert!(pattern_prompt.contains("As an ATS Scanner"));
        assert!(pattern_prompt.contains("Match Percentage: NN%"));

        let json_prompt = AnalysisKind::MatchPercentage.prompt(&JsonExtractor);
        assert!(json_prompt.contains("match_percentage"));
    }

    #[test]
    fn test_unscored_prompts_have_no_format_instruction() {
        let prompt = AnalysisKind::Improvement.prompt(&PatternExtractor);
        assert!(prompt.contains("As a Career Advisor"));
        assert!(!prompt.contains("Match Percentage: NN%"));
    }

    #[tokio::test]
    async fn test_evaluation_skips_scoring_and_text_extraction() {
        // The stub PDF has no body; reaching extraction would fail the request.
        let evaluator = StubEvaluator::replying("Solid backend candidate.");
        let resume = resume();
        let report = run_analysis(
            &evaluator,
            &PatternExtractor,
            AnalysisRequest {
                kind: AnalysisKind::Evaluation,
                job_description: "Rust engineer",
                resume: &resume,
                options: AnalysisOptions::for_kind(AnalysisKind::Evaluation),
            },
        )
        .await
        .unwrap();

        assert_eq!(report.title, "Resume Analysis");
        assert_eq!(report.model_response, "Solid backend candidate.");
        assert!(report.score.is_none());
        assert!(report.keywords.is_none());
        assert!(report.chart.is_none());

        let prompts = evaluator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("As a Technical HR Manager"));
    }

    #[tokio::test]
    async fn test_empty_job_description_is_rejected_before_model_call() {
        let evaluator = StubEvaluator::replying("unused");
        let resume = resume();
        let err = run_analysis(
            &evaluator,
            &PatternExtractor,
            AnalysisRequest {
                kind: AnalysisKind::MatchPercentage,
                job_description: "   ",
                resume: &resume,
                options: AnalysisOptions::for_kind(AnalysisKind::MatchPercentage),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(evaluator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_surfaces_as_llm_error() {
        let evaluator = StubEvaluator::failing();
        let resume = resume();
        let err = run_analysis(
            &evaluator,
            &PatternExtractor,
            AnalysisRequest {
                kind: AnalysisKind::Improvement,
                job_description: "Rust engineer",
                resume: &resume,
                options: AnalysisOptions::for_kind(AnalysisKind::Improvement),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_scored_kind_needs_readable_pdf() {
        let evaluator = StubEvaluator::replying("Match Percentage: 80%");
        let resume = resume();
        let err = run_analysis(
            &evaluator,
            &PatternExtractor,
            AnalysisRequest {
                kind: AnalysisKind::MatchPercentage,
                job_description: "Rust engineer",
                resume: &resume,
                options: AnalysisOptions::for_kind(AnalysisKind::MatchPercentage),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    const JD: &str = "python sql aws docker";
    const RESUME_TEXT: &str = "python sql docker kubernetes";

    #[test]
    fn test_scored_report_has_score_keywords_and_chart() {
        let kind = AnalysisKind::MatchPercentage;
        let report = build_report(
            Uuid::new_v4(),
            kind,
            AnalysisOptions::for_kind(kind),
            &PatternExtractor,
            JD,
            "**Match Percentage: 80%**".to_string(),
            Some(RESUME_TEXT),
        );

        let score = report.score.unwrap();
        assert_eq!(score.model_percentage, Some(80));
        assert_eq!(score.keyword_match, 60.0);
        assert_eq!(score.final_score, 74);

        let keywords = report.keywords.unwrap();
        assert_eq!(keywords.missing, vec!["aws"]);

        let chart = report.chart.unwrap();
        assert_eq!(chart.slices[0].value, 74.0);
    }

    #[test]
    fn test_visualization_can_be_turned_off() {
        let report = build_report(
            Uuid::new_v4(),
            AnalysisKind::MatchPercentage,
            AnalysisOptions {
                include_visualization: false,
                include_keyword_breakdown: false,
            },
            &PatternExtractor,
            JD,
            "Match Percentage: 80%".to_string(),
            Some(RESUME_TEXT),
        );
        assert_eq!(report.score.unwrap().final_score, 74);
        assert!(report.keywords.is_none());
        assert!(report.chart.is_none());
    }

    #[test]
    fn test_unscored_kind_never_charts() {
        // Breakdown requested on an unscored kind: keywords yes, chart no.
        let report = build_report(
            Uuid::new_v4(),
            AnalysisKind::Improvement,
            AnalysisOptions {
                include_visualization: true,
                include_keyword_breakdown: true,
            },
            &PatternExtractor,
            JD,
            "Learn AWS.".to_string(),
            Some(RESUME_TEXT),
        );
        assert!(report.score.is_none());
        assert!(report.chart.is_none());
        assert_eq!(report.keywords.unwrap().intersection_size, 3);
    }

    #[test]
    fn test_report_serializes_kind_and_optional_sections() {
        let report = build_report(
            Uuid::new_v4(),
            AnalysisKind::Evaluation,
            AnalysisOptions::for_kind(AnalysisKind::Evaluation),
            &PatternExtractor,
            JD,
            "Fine.".to_string(),
            None,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "evaluation");
        assert_eq!(json["title"], "Resume Analysis");
        assert!(json["score"].is_null());
        assert!(json["chart"].is_null());
    }
}
