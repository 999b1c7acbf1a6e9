//! Session/Auth: delegates credentials and sessions to the identity
//! provider and opens or closes the caller's workspace accordingly.

pub mod events;
pub mod handlers;
pub mod provider;

use std::time::Instant;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::events::AuthEvent;
use crate::errors::AppError;
use crate::history::try_fetch_history;
use crate::models::user::{AuthSession, AuthUser};
use crate::state::AppState;
use crate::workspace::registry::TokenStatus;
use crate::workspace::{Workspace, WorkspaceSnapshot};

/// Notice returned after a successful sign-up.
pub const SIGN_UP_NOTICE: &str = "Success! Check your email for verification.";

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub user: AuthUser,
    pub workspace: WorkspaceSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: AuthUser,
    pub message: String,
    /// Present when the provider signed the new user in right away.
    pub session: Option<SessionResponse>,
    pub workspace: WorkspaceSnapshot,
}

/// Raw bearer token from the `Authorization` header.
pub struct BearerToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(BearerToken)
            .ok_or(AppError::Unauthorized)
    }
}

/// A bearer token with a live workspace behind it.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub access_token: String,
    pub user: AuthUser,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let access_token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = match state.sessions.resolve(&access_token).await {
            TokenStatus::Fresh(user) => user,
            TokenStatus::Stale(_) => revalidate(state, &access_token).await?,
            TokenStatus::Unknown => return Err(AppError::Unauthorized),
        };
        Ok(CurrentSession { access_token, user })
    }
}

/// Asks the provider about a token whose last check is old. A rejected
/// token loses its workspace.
async fn revalidate(state: &AppState, access_token: &str) -> Result<AuthUser, AppError> {
    match state.identity.get_user(access_token).await {
        Ok(user) => {
            state.sessions.mark_validated(access_token).await;
            Ok(user)
        }
        Err(AppError::Unauthorized) => {
            if let Some(workspace) = state.sessions.remove(access_token).await {
                if let Some(user) = workspace.user() {
                    info!("Provider no longer accepts the token of user {}", user.id);
                    state
                        .auth_events
                        .publish(AuthEvent::SignedOut { user_id: user.id });
                }
            }
            Err(AppError::Unauthorized)
        }
        Err(e) => Err(e),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub async fn sign_in(
    state: &AppState,
    request: &CredentialsRequest,
) -> Result<SessionResponse, AppError> {
    request.validate()?;
    let session = state
        .identity
        .sign_in(request.email.trim(), &request.password)
        .await?;
    Ok(open_workspace(state, session).await)
}

pub async fn sign_up(
    state: &AppState,
    request: &CredentialsRequest,
) -> Result<SignUpResponse, AppError> {
    request.validate()?;
    let outcome = state
        .identity
        .sign_up(request.email.trim(), &request.password)
        .await?;

    if let Err(e) = state
        .records
        .insert_profile(outcome.user.id, outcome.user.email.as_deref())
        .await
    {
        warn!("Profile insert failed for new user {}: {e}", outcome.user.id);
    }
    info!("User {} signed up", outcome.user.id);

    match outcome.session {
        Some(session) => {
            let session = open_workspace(state, session).await;
            Ok(SignUpResponse {
                user: outcome.user,
                message: SIGN_UP_NOTICE.to_string(),
                workspace: session.workspace.clone(),
                session: Some(session),
            })
        }
        None => {
            let mut workspace = Workspace::new();
            workspace.set_notice(SIGN_UP_NOTICE);
            Ok(SignUpResponse {
                user: outcome.user,
                message: SIGN_UP_NOTICE.to_string(),
                session: None,
                workspace: workspace.snapshot(Instant::now()),
            })
        }
    }
}

/// Ends the session locally whatever the provider says.
pub async fn sign_out(state: &AppState, access_token: &str) -> WorkspaceSnapshot {
    if let Err(e) = state.identity.sign_out(access_token).await {
        warn!("Provider sign-out failed: {e}");
    }

    let mut workspace = state.sessions.remove(access_token).await.unwrap_or_default();
    if let Some(user) = workspace.user() {
        state
            .auth_events
            .publish(AuthEvent::SignedOut { user_id: user.id });
    }
    workspace.sign_out();
    workspace.snapshot(Instant::now())
}

/// Re-attaches a client holding a valid provider token to its workspace,
/// recreating the workspace if the service has none for it.
pub async fn restore_session(
    state: &AppState,
    access_token: &str,
) -> Result<SessionResponse, AppError> {
    let user = state.identity.get_user(access_token).await?;
    state.sessions.mark_validated(access_token).await;

    let existing = state
        .sessions
        .with(access_token, |ws| ws.snapshot(Instant::now()))
        .await;
    if let Ok(workspace) = existing {
        return Ok(SessionResponse {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_in: None,
            user,
            workspace,
        });
    }

    let session = AuthSession {
        access_token: access_token.to_string(),
        refresh_token: None,
        expires_in: None,
        user,
    };
    Ok(open_workspace(state, session).await)
}

/// Stamps the login, loads history and registers a dashboard workspace.
/// Neither side effect can fail the sign-in.
async fn open_workspace(state: &AppState, session: AuthSession) -> SessionResponse {
    let user = session.user.clone();

    if let Err(e) = state.records.touch_last_login(user.id, Utc::now()).await {
        warn!("Failed to update last login for user {}: {e}", user.id);
    }
    let history = try_fetch_history(state.records.as_ref(), user.id)
        .await
        .unwrap_or_default();

    let mut workspace = Workspace::new();
    workspace.sign_in(user.clone(), history);
    let snapshot = workspace.snapshot(Instant::now());
    state
        .sessions
        .insert(session.access_token.clone(), workspace, session.expires_in)
        .await;
    state
        .auth_events
        .publish(AuthEvent::SignedIn { user_id: user.id });

    SessionResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
        user,
        workspace: snapshot,
    }
}
