use axum::{extract::State, Json};

use crate::auth::{
    restore_session, sign_in, sign_out, sign_up, BearerToken, CredentialsRequest,
    SessionResponse, SignUpResponse,
};
use crate::errors::AppError;
use crate::state::AppState;
use crate::workspace::WorkspaceSnapshot;

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(sign_in(&state, &request).await?))
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    Ok(Json(sign_up(&state, &request).await?))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Json<WorkspaceSnapshot> {
    Json(sign_out(&state, &token).await)
}

/// GET /api/v1/auth/session
///
/// Validates the bearer token with the identity provider and returns the
/// session's workspace, recreating it when needed.
pub async fn handle_get_session(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(restore_session(&state, &token).await?))
}
