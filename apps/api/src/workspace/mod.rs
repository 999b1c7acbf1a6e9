//! Workspace: the per-session view state the client renders from.
//!
//! One `AppView` at a time, plus the resume draft, the latest result, the
//! last surfaced error and the cached history. All transitions go through
//! the methods here; handlers never poke the fields directly.

pub mod handlers;
pub mod registry;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, MISSING_ASSETS_MESSAGE};
use crate::history::average_score;
use crate::models::analysis::{AnalysisResult, ScoreBand};
use crate::models::history::OptimizationHistory;
use crate::models::resume::{FileData, ResumeInput, ResumeSource};
use crate::models::user::AuthUser;

/// Status lines shown while an analysis runs. Purely cosmetic: the index
/// advances on a timer, not on actual progress of the call.
pub const LOADING_STEPS: [&str; 6] = [
    "Initializing Gemini Pro engine...",
    "Parsing resume structure...",
    "Analyzing job description keywords...",
    "Calculating ATS match compatibility...",
    "Engineering custom bullet points...",
    "Drafting high-impact cover letter...",
];
pub const STEP_INTERVAL: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppView {
    Login,
    Dashboard,
    Input,
    Results,
}

/// Index into `LOADING_STEPS` after `elapsed`, capped at the last step.
pub fn progress_step(elapsed: Duration) -> usize {
    let step = (elapsed.as_millis() / STEP_INTERVAL.as_millis()) as usize;
    step.min(LOADING_STEPS.len() - 1)
}

/// Resume and job description being edited. At most one resume source is
/// populated at any time.
#[derive(Debug, Clone, Default)]
pub struct ResumeDraft {
    resume_text: String,
    resume_file: Option<FileData>,
    job_description: String,
}

impl ResumeDraft {
    pub fn set_resume_text(&mut self, text: String) {
        self.resume_text = text;
        self.resume_file = None;
    }

    pub fn attach(&mut self, source: ResumeSource) {
        match source {
            ResumeSource::Text(text) => self.set_resume_text(text),
            ResumeSource::File(file) => {
                self.resume_file = Some(file);
                self.resume_text.clear();
            }
        }
    }

    pub fn set_job_description(&mut self, text: String) {
        self.job_description = text;
    }

    /// The request for the analyzer, or the missing-assets error.
    pub fn to_input(&self) -> Result<ResumeInput, AppError> {
        let resume = match &self.resume_file {
            Some(file) => Some(ResumeSource::File(file.clone())),
            None if !self.resume_text.trim().is_empty() => {
                Some(ResumeSource::Text(self.resume_text.clone()))
            }
            None => None,
        };

        match resume {
            Some(resume) if !self.job_description.trim().is_empty() => Ok(ResumeInput {
                resume,
                job_description: self.job_description.clone(),
            }),
            _ => Err(AppError::Validation(MISSING_ASSETS_MESSAGE.to_string())),
        }
    }

    fn summary(&self) -> ResumeSummary {
        match &self.resume_file {
            Some(file) => ResumeSummary::File {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            },
            None if !self.resume_text.is_empty() => ResumeSummary::Text {
                chars: self.resume_text.chars().count(),
            },
            None => ResumeSummary::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumeSummary {
    Empty,
    Text { chars: usize },
    File { name: String, mime_type: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub score_band: ScoreBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub average_score: u32,
}

impl HistoryStats {
    pub fn of(history: &[OptimizationHistory]) -> Self {
        Self {
            total: history.len(),
            average_score: average_score(history),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisProgress {
    pub step: usize,
    pub message: &'static str,
}

/// Everything a client needs to render the current view.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSnapshot {
    pub view: AppView,
    pub user: Option<AuthUser>,
    pub resume: ResumeSummary,
    pub job_description: String,
    pub result: Option<ResultView>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub history: Vec<OptimizationHistory>,
    pub stats: HistoryStats,
    pub progress: Option<AnalysisProgress>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    view: AppView,
    user: Option<AuthUser>,
    draft: ResumeDraft,
    result: Option<AnalysisResult>,
    error: Option<String>,
    notice: Option<String>,
    history: Vec<OptimizationHistory>,
    analysis_started: Option<Instant>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A signed-out workspace showing the login view.
    pub fn new() -> Self {
        Self {
            view: AppView::Login,
            user: None,
            draft: ResumeDraft::default(),
            result: None,
            error: None,
            notice: None,
            history: Vec::new(),
            analysis_started: None,
        }
    }

    #[cfg(test)]
    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[cfg(test)]
    pub fn history(&self) -> &[OptimizationHistory] {
        &self.history
    }

    pub fn draft_mut(&mut self) -> &mut ResumeDraft {
        &mut self.draft
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis_started.is_some()
    }

    pub fn sign_in(&mut self, user: AuthUser, history: Vec<OptimizationHistory>) {
        self.user = Some(user);
        self.history = history;
        self.error = None;
        self.notice = None;
        self.view = AppView::Dashboard;
    }

    pub fn sign_out(&mut self) {
        *self = Self::new();
    }

    /// Message shown on the login view, e.g. after sign-up.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// User-driven navigation. `fresh` on the input view starts a new
    /// analysis by discarding the previous result.
    pub fn navigate(&mut self, target: AppView, fresh: bool) -> Result<(), AppError> {
        if self.user.is_none() {
            return Err(AppError::Unauthorized);
        }
        match target {
            AppView::Login => {
                return Err(AppError::Validation(
                    "Sign out to return to the login view".to_string(),
                ))
            }
            AppView::Results if self.result.is_none() => {
                return Err(AppError::Validation(
                    "There is no analysis result to show yet".to_string(),
                ))
            }
            AppView::Input if fresh => self.result = None,
            _ => {}
        }
        self.view = target;
        Ok(())
    }

    /// Validates the draft and marks the analysis as running.
    pub fn begin_analysis(&mut self, now: Instant) -> Result<ResumeInput, AppError> {
        if self.is_analyzing() {
            return Err(AppError::Conflict(
                "An analysis is already running for this session".to_string(),
            ));
        }
        let input = self.draft.to_input().map_err(|e| {
            self.error = Some(e.user_message());
            e
        })?;
        self.error = None;
        self.analysis_started = Some(now);
        Ok(input)
    }

    pub fn analysis_succeeded(&mut self, result: AnalysisResult) {
        self.analysis_started = None;
        self.result = Some(result);
        self.view = AppView::Results;
    }

    /// Surfaces the error; the view stays where it was.
    pub fn analysis_failed(&mut self, error: &AppError) {
        self.analysis_started = None;
        self.error = Some(error.user_message());
    }

    /// Clears a run that never reported back. A newer run started after
    /// `started` is left alone.
    pub fn analysis_abandoned(&mut self, started: Instant) {
        if self.analysis_started == Some(started) {
            self.analysis_started = None;
        }
    }

    /// Shows a previously stored result.
    pub fn open_result(&mut self, result: AnalysisResult) {
        self.result = Some(result);
        self.view = AppView::Results;
    }

    pub fn replace_history(&mut self, history: Vec<OptimizationHistory>) {
        self.history = history;
    }

    pub fn progress(&self, now: Instant) -> Option<AnalysisProgress> {
        self.analysis_started.map(|started| {
            let step = progress_step(now.saturating_duration_since(started));
            AnalysisProgress {
                step,
                message: LOADING_STEPS[step],
            }
        })
    }

    pub fn snapshot(&self, now: Instant) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            view: self.view,
            user: self.user.clone(),
            resume: self.draft.summary(),
            job_description: self.draft.job_description.clone(),
            result: self.result.clone().map(|result| ResultView {
                score_band: ScoreBand::for_score(result.match_score),
                result,
            }),
            error: self.error.clone(),
            notice: self.notice.clone(),
            history: self.history.clone(),
            stats: HistoryStats::of(&self.history),
            progress: self.progress(now),
        }
    }
}
