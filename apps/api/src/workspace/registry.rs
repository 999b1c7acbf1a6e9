use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use crate::errors::AppError;
use crate::models::user::AuthUser;
use crate::workspace::Workspace;

/// How long a token is trusted before the identity provider is asked again.
pub const REVALIDATE_AFTER: Duration = Duration::from_secs(300);

struct Entry {
    workspace: Workspace,
    expires_at: Option<Instant>,
    validated_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// What the registry knows about a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    /// Checked with the provider within `REVALIDATE_AFTER`.
    Fresh(AuthUser),
    /// Has a workspace, but the provider should confirm it first.
    Stale(AuthUser),
    /// No workspace, or the token has expired.
    Unknown,
}

/// Live workspaces keyed by access token.
///
/// The lock is only held for synchronous workspace mutations, never across
/// a provider call. Expired entries are dropped on lookup and on insert.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a workspace for a token the provider has just vouched for.
    /// `expires_in` is the provider's token lifetime in seconds.
    pub async fn insert(&self, access_token: String, workspace: Workspace, expires_in: Option<u64>) {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        sessions.retain(|_, entry| !entry.is_expired(now));
        sessions.insert(
            access_token,
            Entry {
                workspace,
                expires_at: expires_in.map(|secs| now + Duration::from_secs(secs)),
                validated_at: now,
            },
        );
    }

    pub async fn remove(&self, access_token: &str) -> Option<Workspace> {
        self.inner
            .write()
            .await
            .remove(access_token)
            .map(|entry| entry.workspace)
    }

    #[cfg(test)]
    pub async fn contains(&self, access_token: &str) -> bool {
        self.inner.read().await.contains_key(access_token)
    }

    /// Resolves a token to its signed-in user, evicting it if expired.
    pub async fn resolve(&self, access_token: &str) -> TokenStatus {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let Some(entry) = sessions.get(access_token) else {
            return TokenStatus::Unknown;
        };
        if entry.is_expired(now) {
            sessions.remove(access_token);
            return TokenStatus::Unknown;
        }
        match entry.workspace.user().cloned() {
            Some(user) if now.duration_since(entry.validated_at) < REVALIDATE_AFTER => {
                TokenStatus::Fresh(user)
            }
            Some(user) => TokenStatus::Stale(user),
            None => TokenStatus::Unknown,
        }
    }

    /// Records that the provider accepted the token again.
    pub async fn mark_validated(&self, access_token: &str) {
        if let Some(entry) = self.inner.write().await.get_mut(access_token) {
            entry.validated_at = Instant::now();
        }
    }

    /// Runs `f` against the token's workspace. Unknown or expired tokens are
    /// `Unauthorized`.
    pub async fn with<R>(
        &self,
        access_token: &str,
        f: impl FnOnce(&mut Workspace) -> R,
    ) -> Result<R, AppError> {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        if sessions.get(access_token).is_some_and(|e| e.is_expired(now)) {
            sessions.remove(access_token);
        }
        let entry = sessions.get_mut(access_token).ok_or(AppError::Unauthorized)?;
        Ok(f(&mut entry.workspace))
    }

    /// Clears an analysis that ended without an outcome, e.g. because the
    /// request was dropped mid-call. Callable from `Drop`: it applies the
    /// change right away when the lock is free, otherwise from a task.
    pub fn abandon_analysis(&self, access_token: &str, started: std::time::Instant) {
        if let Ok(mut sessions) = self.inner.try_write() {
            if let Some(entry) = sessions.get_mut(access_token) {
                entry.workspace.analysis_abandoned(started);
            }
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let inner = self.inner.clone();
        let access_token = access_token.to_string();
        runtime.spawn(async move {
            if let Some(entry) = inner.write().await.get_mut(&access_token) {
                entry.workspace.analysis_abandoned(started);
            }
        });
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
