use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// Session lifecycle change, published after the workspace has been updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: Uuid },
    SignedOut { user_id: Uuid },
}

/// Broadcast bus for `AuthEvent`s. Cloning shares the same channel.
#[derive(Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Having no subscribers is fine.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.sender.send(event);
    }
}

/// Logs every auth event until the bus closes.
pub async fn log_auth_events(mut receiver: broadcast::Receiver<AuthEvent>) {
    loop {
        match receiver.recv().await {
            Ok(AuthEvent::SignedIn { user_id }) => info!("User {user_id} signed in"),
            Ok(AuthEvent::SignedOut { user_id }) => info!("User {user_id} signed out"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Auth event listener lagged, skipped {skipped} events")
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
