use std::sync::Arc;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::auth::events::AuthEvents;
use crate::auth::provider::IdentityProvider;
use crate::config::Config;
use crate::records::RecordStore;
use crate::workspace::registry::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Credential checks and session lifecycle. Default: `SupabaseAuth`.
    pub identity: Arc<dyn IdentityProvider>,
    /// `profiles` + `optimizations`. Default: `PgRecordStore`.
    pub records: Arc<dyn RecordStore>,
    /// Pluggable analyzer. Default: `GeminiAnalyzer`.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub sessions: SessionRegistry,
    pub auth_events: AuthEvents,
    pub config: Config,
}
