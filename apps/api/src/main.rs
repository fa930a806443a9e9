mod auth;
mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod session;
mod state;
mod store;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::session::{SessionLocks, SessionRecords};
use crate::state::AppState;
use crate::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use crate::wizard::capabilities::{PlaceholderAnswerer, UnconfiguredEmbeddingStore};

/// How often expired session records are swept out.
const SESSION_PRUNE_INTERVAL_SECS: u64 = 5 * 60;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentScout API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn DocumentStore> = if config.uses_memory_store() {
        info!("Using in-memory document store; data is lost on restart");
        Arc::new(MemoryDocumentStore::new())
    } else {
        Arc::new(PgDocumentStore::new(create_pool(&config.database_url).await?))
    };

    // AI capabilities are placeholders until real backends are wired in
    let state = AppState {
        store,
        screening: Arc::new(PlaceholderAnswerer),
        retrieval: Arc::new(PlaceholderAnswerer),
        embeddings: Arc::new(UnconfiguredEmbeddingStore),
        sessions: SessionRecords::new(),
        session_locks: SessionLocks::new(),
    };

    tokio::spawn(
        state
            .sessions
            .clone()
            .prune_every(Duration::from_secs(SESSION_PRUNE_INTERVAL_SECS)),
    );

    if !config.secure_cookies {
        info!("Session cookies are not marked Secure (SECURE_COOKIES=false)");
    }

    let app = build_router(state, config.secure_cookies)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
