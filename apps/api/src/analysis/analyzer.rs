//! Analyzer: pluggable, trait-based backend that turns a resume and a job
//! description into an `AnalysisResult`.
//!
//! Default: `GeminiAnalyzer` (structured output via `llm_client`).
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`.

use async_trait::async_trait;
use tracing::error;

use crate::analysis::prompts::{
    analysis_response_schema, build_analysis_prompt, RESUME_TEXT_PREFIX,
};
use crate::errors::{AppError, EMPTY_RESPONSE_MESSAGE, OPTIMIZATION_FAILED_MESSAGE};
use crate::llm_client::prompts::ANALYSIS_THINKING_BUDGET;
use crate::llm_client::{GenerationConfig, LlmClient, LlmError, Part};
use crate::models::analysis::AnalysisResult;
use crate::models::resume::{ResumeInput, ResumeSource};

/// The analyzer trait. Implement this to swap backends without touching
/// the orchestration or handler code.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, input: &ResumeInput) -> Result<AnalysisResult, AppError>;
}

pub struct GeminiAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, input: &ResumeInput) -> Result<AnalysisResult, AppError> {
        let parts = build_request_parts(input);
        let config = GenerationConfig::json(analysis_response_schema())
            .with_thinking_budget(ANALYSIS_THINKING_BUDGET);

        self.0
            .call_json::<AnalysisResult>(&parts, &config)
            .await
            .map_err(|e| {
                error!("Resume analysis failed: {e}");
                AppError::Optimization(user_message_for(&e).to_string())
            })
    }
}

/// Resume part first, then the instruction part.
pub fn build_request_parts(input: &ResumeInput) -> Vec<Part> {
    let resume_part = match &input.resume {
        ResumeSource::File(file) => Part::inline(file.mime_type.clone(), file.data.clone()),
        ResumeSource::Text(text) => Part::text(format!("{RESUME_TEXT_PREFIX}{text}")),
    };
    vec![resume_part, Part::text(build_analysis_prompt(&input.job_description))]
}

fn user_message_for(err: &LlmError) -> &'static str {
    match err {
        LlmError::EmptyContent => EMPTY_RESPONSE_MESSAGE,
        _ => OPTIMIZATION_FAILED_MESSAGE,
    }
}
