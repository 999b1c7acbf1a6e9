//! Optimization history: projection of persisted rows for display,
//! derived labels for new rows, and summary stats.

pub mod handlers;

use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::{OptimizationHistory, OptimizationRow};
use crate::records::RecordStore;

/// Company label stored with every optimization.
pub const DEFAULT_COMPANY: &str = "Target Application";
/// Title used when the job description has no usable first line.
pub const FALLBACK_JOB_TITLE: &str = "New Analysis";
const JOB_TITLE_MAX_CHARS: usize = 50;

/// Reads the user's optimizations, newest first, projected for display.
pub async fn fetch_history(
    records: &dyn RecordStore,
    user_id: Uuid,
) -> Result<Vec<OptimizationHistory>, AppError> {
    let rows = records.list_optimizations(user_id).await?;
    Ok(rows.iter().map(project_row).collect())
}

/// Like `fetch_history`, but a failed read is logged and yields `None`
/// so callers can keep whatever they already show.
pub async fn try_fetch_history(
    records: &dyn RecordStore,
    user_id: Uuid,
) -> Option<Vec<OptimizationHistory>> {
    match fetch_history(records, user_id).await {
        Ok(history) => Some(history),
        Err(e) => {
            warn!("History fetch failed for user {user_id}: {e}");
            None
        }
    }
}

pub fn project_row(row: &OptimizationRow) -> OptimizationHistory {
    OptimizationHistory {
        id: row.id,
        job_title: row.job_title.clone(),
        company: row.company.clone(),
        date: row.created_at.format("%-m/%-d/%Y").to_string(),
        score: row.score,
    }
}

/// First line of the job description, cut to 50 characters and trimmed.
pub fn derive_job_title(job_description: &str) -> String {
    let first_line = job_description.split('\n').next().unwrap_or_default();
    let title: String = first_line.chars().take(JOB_TITLE_MAX_CHARS).collect();
    let title = title.trim();
    if title.is_empty() {
        FALLBACK_JOB_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Mean score rounded to the nearest integer, halves up. 0 when empty.
pub fn average_score(history: &[OptimizationHistory]) -> u32 {
    if history.is_empty() {
        return 0;
    }
    let mean = history.iter().map(|h| h.score).sum::<f64>() / history.len() as f64;
    (mean + 0.5).floor().max(0.0) as u32
}
