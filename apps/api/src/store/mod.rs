//! Persistence gateway — a minimal document-store capability.
//!
//! Records are JSON documents grouped in named collections. Callers only ever
//! `insert_one` and `find_one`; there are no updates, deletes or transactions.
//!
//! `AppState` holds an `Arc<dyn DocumentStore>`, chosen at startup from
//! `DATABASE_URL` (PostgreSQL or `memory://`).

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Candidates,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Candidates => "candidates",
        }
    }

    /// Top-level field that must be unique across the collection, if any.
    pub fn unique_key(self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("username"),
            Collection::Candidates => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {key} in collection {collection}")]
    Duplicate {
        collection: Collection,
        key: &'static str,
    },

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: Collection, document: Value) -> Result<(), StoreError>;

    /// Returns the first document (in insertion order) matching `filter`.
    async fn find_one(
        &self,
        collection: Collection,
        filter: Value,
    ) -> Result<Option<Value>, StoreError>;
}

/// Serializes `record` and inserts it.
pub async fn insert_record<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: Collection,
    record: &T,
) -> Result<(), StoreError> {
    let document = serde_json::to_value(record)?;
    store.insert_one(collection, document).await
}

/// Finds the first matching document and deserializes it.
pub async fn find_record<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filter: Value,
) -> Result<Option<T>, StoreError> {
    match store.find_one(collection, filter).await? {
        Some(document) => Ok(Some(serde_json::from_value(document)?)),
        None => Ok(None),
    }
}

/// Top-level containment: every field of `filter` must be present and equal
/// in `document`. A non-object filter matches only an identical document.
pub fn matches_filter(document: &Value, filter: &Value) -> bool {
    match (document, filter) {
        (Value::Object(doc), Value::Object(fields)) => fields
            .iter()
            .all(|(key, expected)| doc.get(key) == Some(expected)),
        _ => document == filter,
    }
}
