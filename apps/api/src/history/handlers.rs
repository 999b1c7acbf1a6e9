use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::CurrentSession;
use crate::errors::AppError;
use crate::history::fetch_history;
use crate::models::analysis::AnalysisResult;
use crate::models::history::OptimizationHistory;
use crate::state::AppState;
use crate::workspace::{HistoryStats, WorkspaceSnapshot};

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<OptimizationHistory>,
    pub stats: HistoryStats,
}

/// GET /api/v1/history
///
/// Re-reads the caller's history from the record store and refreshes the
/// workspace copy.
pub async fn handle_list_history(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<HistoryResponse>, AppError> {
    let entries = fetch_history(state.records.as_ref(), session.user.id).await?;
    let stats = HistoryStats::of(&entries);

    let cached = entries.clone();
    state
        .sessions
        .with(&session.access_token, |ws| ws.replace_history(cached))
        .await?;

    Ok(Json(HistoryResponse { entries, stats }))
}

/// GET /api/v1/history/:id
///
/// Reopens a stored optimization in the results view.
pub async fn handle_open_history_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: CurrentSession,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    let row = state
        .records
        .get_optimization(session.user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Optimization {id} not found")))?;

    let result: AnalysisResult = serde_json::from_value(row.result_json).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Stored optimization {id} is unreadable: {e}"))
    })?;

    let snapshot = state
        .sessions
        .with(&session.access_token, |ws| {
            ws.open_result(result);
            ws.snapshot(Instant::now())
        })
        .await?;

    Ok(Json(snapshot))
}
