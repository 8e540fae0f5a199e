// Task prompts for the three analysis kinds.
// Wrapped with llm_client::prompts fragments before sending.

pub const EVALUATION_PROMPT: &str = r#"
As a Technical HR Manager, evaluate this resume against the job description:
1. Identify matching skills and qualifications
2. Highlight strengths and weaknesses
3. Provide overall suitability assessment
"#;

pub const IMPROVEMENT_PROMPT: &str = r#"
As a Career Advisor, provide specific recommendations:
1. Identify skill gaps
2. Suggest learning resources
3. Recommend improvement strategies
"#;

pub const MATCH_PERCENTAGE_PROMPT: &str = r#"
As an ATS Scanner, provide:
1. Match percentage (bold)
2. Missing keywords (bold)
3. Final assessment (bold)
Format with clear headings.
"#;
