//! Resume Analysis: orchestrates one analysis round-trip.
//!
//! Flow: validate draft → analyzer (single attempt) → show result →
//!       persist optimization row → refresh history.
//!
//! All LLM calls go through llm_client via `GeminiAnalyzer`.

pub mod analyzer;
pub mod handlers;
pub mod prompts;

use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::CurrentSession;
use crate::errors::AppError;
use crate::history::{derive_job_title, try_fetch_history, DEFAULT_COMPANY};
use crate::models::analysis::AnalysisResult;
use crate::models::history::NewOptimization;
use crate::state::AppState;
use crate::workspace::registry::SessionRegistry;
use crate::workspace::WorkspaceSnapshot;

/// Runs the analysis for the session's current draft.
///
/// Failures are recorded on the workspace as the user-facing string and
/// returned; the view does not change.
pub async fn run_analysis(
    state: &AppState,
    session: &CurrentSession,
) -> Result<WorkspaceSnapshot, AppError> {
    let token = session.access_token.as_str();
    let started = Instant::now();

    let input = state
        .sessions
        .with(token, |ws| ws.begin_analysis(started))
        .await??;
    let mut run = RunGuard {
        sessions: &state.sessions,
        token,
        started,
        settled: false,
    };
    info!("Running analysis for user {}", session.user.id);

    let outcome = state.analyzer.analyze(&input).await;
    run.settled = true;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            state.sessions.with(token, |ws| ws.analysis_failed(&e)).await?;
            return Err(e);
        }
    };
    info!(
        "Analysis complete: match score {} for user {}",
        result.match_score, session.user.id
    );

    state
        .sessions
        .with(token, |ws| ws.analysis_succeeded(result.clone()))
        .await?;

    persist_optimization(state, session.user.id, &input.job_description, result).await;

    if let Some(history) = try_fetch_history(state.records.as_ref(), session.user.id).await {
        state
            .sessions
            .with(token, |ws| ws.replace_history(history))
            .await?;
    }

    state
        .sessions
        .with(token, |ws| ws.snapshot(Instant::now()))
        .await
}

/// Frees the session if the analysis future is dropped before the analyzer
/// answers, e.g. when the client disconnects mid-call.
struct RunGuard<'a> {
    sessions: &'a SessionRegistry,
    token: &'a str,
    started: Instant,
    settled: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Analysis abandoned before the analyzer answered");
            self.sessions.abandon_analysis(self.token, self.started);
        }
    }
}

/// Writes the optimization row. The result is already shown, so a failed
/// write is logged rather than surfaced.
async fn persist_optimization(
    state: &AppState,
    user_id: Uuid,
    job_description: &str,
    result: AnalysisResult,
) {
    let row = NewOptimization {
        user_id,
        job_title: derive_job_title(job_description),
        company: DEFAULT_COMPANY.to_string(),
        score: result.match_score,
        result,
    };
    match state.records.insert_optimization(row).await {
        Ok(inserted) => info!("Persisted optimization {} for user {user_id}", inserted.id),
        Err(e) => warn!("Failed to persist optimization for user {user_id}: {e}"),
    }
}
