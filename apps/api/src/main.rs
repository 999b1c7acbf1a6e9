mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod history;
mod llm_client;
mod models;
mod records;
mod routes;
mod state;
mod upload;
mod workspace;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::GeminiAnalyzer;
use crate::auth::events::{log_auth_events, AuthEvents};
use crate::auth::provider::SupabaseAuth;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::records::PgRecordStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workspace::registry::SessionRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Elevate API v{}", env!("CARGO_PKG_VERSION"));

    // Record store (profiles + optimizations)
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    let records = Arc::new(PgRecordStore::new(db));

    // Identity provider
    let identity = Arc::new(SupabaseAuth::new(
        &config.supabase_url,
        config.supabase_anon_key.clone(),
    )?);
    info!("Identity provider client initialized ({})", config.supabase_url);

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let analyzer = Arc::new(GeminiAnalyzer(llm));

    let auth_events = AuthEvents::new();
    tokio::spawn(log_auth_events(auth_events.subscribe()));

    // Build app state
    let state = AppState {
        identity,
        records,
        analyzer,
        sessions: SessionRegistry::new(),
        auth_events,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the client origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
