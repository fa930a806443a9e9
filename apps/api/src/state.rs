use std::sync::Arc;

use crate::session::{SessionLocks, SessionRecords};
use crate::store::DocumentStore;
use crate::wizard::capabilities::{Answerer, EmbeddingStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// Per-user wizard state is not here; it lives in the session store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    /// Answers screening questions on step 3.
    pub screening: Arc<dyn Answerer>,
    /// Answers chatbot queries on step 4.
    pub retrieval: Arc<dyn Answerer>,
    pub embeddings: Arc<dyn EmbeddingStore>,
    /// Server-side session records behind the session cookie.
    pub sessions: SessionRecords,
    pub session_locks: SessionLocks,
}
