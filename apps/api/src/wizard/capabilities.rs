//! AI capability seams for the screening and chatbot steps.
//!
//! Nothing is implemented behind these traits. `AppState` carries
//! `Arc<dyn Answerer>` / `Arc<dyn EmbeddingStore>`; the placeholders below are
//! what ships until real backends are plugged in.

use async_trait::async_trait;
use thiserror::Error;

/// Text shown wherever an AI answer would appear.
pub const PLACEHOLDER_RESPONSE: &str = "This is where the AI response will be displayed.";

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("{0} is not configured")]
    Unconfigured(&'static str),
}

/// Answers a free-text question (screening model, retrieval chatbot).
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, CapabilityError>;
}

/// Stores a document together with its embedding for later retrieval.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn store_document(&self, doc_id: &str, text: &str) -> Result<(), CapabilityError>;
}

pub struct PlaceholderAnswerer;

#[async_trait]
impl Answerer for PlaceholderAnswerer {
    async fn answer(&self, _question: &str) -> Result<String, CapabilityError> {
        Ok(PLACEHOLDER_RESPONSE.to_string())
    }
}

pub struct UnconfiguredEmbeddingStore;

#[async_trait]
impl EmbeddingStore for UnconfiguredEmbeddingStore {
    async fn store_document(&self, _doc_id: &str, _text: &str) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unconfigured("embedding store"))
    }
}
