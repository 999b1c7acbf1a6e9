use axum::{extract::State, Json};

use crate::analysis::run_analysis;
use crate::auth::CurrentSession;
use crate::errors::AppError;
use crate::state::AppState;
use crate::workspace::WorkspaceSnapshot;

/// POST /api/v1/analyze
///
/// Analyzes the session's draft resume against its job description.
/// On success the workspace moves to the results view and the history
/// gains one entry.
pub async fn handle_analyze(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    Ok(Json(run_analysis(&state, &session).await?))
}
