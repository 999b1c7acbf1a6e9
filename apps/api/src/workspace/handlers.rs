use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentSession;
use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::read_resume_file;
use crate::workspace::{AppView, WorkspaceSnapshot};

const UPLOAD_FIELD: &str = "file";
const COVER_LETTER_FILENAME: &str = "Cover_Letter_Draft.txt";

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub view: AppView,
    #[serde(default)]
    pub fresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// GET /api/v1/workspace
pub async fn handle_get_workspace(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .with(&session.access_token, |ws| ws.snapshot(Instant::now()))
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/workspace/view
pub async fn handle_navigate(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .with(&session.access_token, |ws| {
            ws.navigate(request.view, request.fresh)?;
            Ok::<_, AppError>(ws.snapshot(Instant::now()))
        })
        .await??;
    Ok(Json(snapshot))
}

/// PUT /api/v1/workspace/resume-text
pub async fn handle_set_resume_text(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<TextRequest>,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .with(&session.access_token, |ws| {
            ws.draft_mut().set_resume_text(request.text);
            ws.snapshot(Instant::now())
        })
        .await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/workspace/job-description
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<TextRequest>,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .with(&session.access_token, |ws| {
            ws.draft_mut().set_job_description(request.text);
            ws.snapshot(Instant::now())
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/workspace/resume-file
///
/// Multipart upload, field `file`. Plain text replaces the resume text;
/// anything else is stored base64-encoded for inline delivery.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    session: CurrentSession,
    mut multipart: Multipart,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    let mut source = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;

        info!(
            "Resume upload '{}' ({} bytes, {})",
            filename,
            bytes.len(),
            content_type.as_deref().unwrap_or("no content type")
        );
        source = Some(read_resume_file(&filename, content_type.as_deref(), &bytes));
        break;
    }

    let source = source.ok_or_else(|| {
        AppError::Validation(format!("Upload must include a '{UPLOAD_FIELD}' field"))
    })?;

    let snapshot = state
        .sessions
        .with(&session.access_token, |ws| {
            ws.draft_mut().attach(source);
            ws.snapshot(Instant::now())
        })
        .await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/workspace/cover-letter
///
/// The current result's cover letter as a plain-text download.
pub async fn handle_download_cover_letter(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<impl IntoResponse, AppError> {
    let letter = state
        .sessions
        .with(&session.access_token, |ws| {
            ws.result().map(|r| r.cover_letter.clone())
        })
        .await?
        .ok_or_else(|| AppError::NotFound("No cover letter has been generated yet".to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{COVER_LETTER_FILENAME}\""),
            ),
        ],
        letter,
    ))
}
