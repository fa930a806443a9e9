use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{matches_filter, Collection, DocumentStore, StoreError};

/// In-process document store. Same matching and unique-key rules as the
/// PostgreSQL backend; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents ever written to `collection`.
    #[cfg(test)]
    pub fn write_count(&self, collection: Collection) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Snapshot of every document in `collection`, in insertion order.
    #[cfg(test)]
    pub fn documents(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .lock()
            .map(|c| c.get(&collection).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        let documents = collections.entry(collection).or_default();

        if let Some(key) = collection.unique_key() {
            if let Some(value) = document.get(key) {
                if documents.iter().any(|d| d.get(key) == Some(value)) {
                    return Err(StoreError::Duplicate { collection, key });
                }
            }
        }

        documents.push(document);
        debug!("inserted document into {collection} ({} total)", documents.len());
        Ok(())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Value,
    ) -> Result<Option<Value>, StoreError> {
        let collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;

        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches_filter(d, &filter)))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Candidates, json!({"name": "Ada", "experience": 7}))
            .await
            .unwrap();

        let found = store
            .find_one(Collection::Candidates, json!({"name": "Ada"}))
            .await
            .unwrap();
        assert_eq!(found, Some(json!({"name": "Ada", "experience": 7})));
        assert_eq!(store.write_count(Collection::Candidates), 1);
        assert_eq!(store.write_count(Collection::Users), 0);
    }

    #[tokio::test]
    async fn test_find_returns_first_inserted_match() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Candidates, json!({"name": "Ada", "location": "London"}))
            .await
            .unwrap();
        store
            .insert_one(Collection::Candidates, json!({"name": "Ada", "location": "Paris"}))
            .await
            .unwrap();

        let found = store
            .find_one(Collection::Candidates, json!({"name": "Ada"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["location"], "London");
    }

    #[tokio::test]
    async fn test_unique_username_is_enforced() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Users, json!({"username": "ada", "password_digest": "a"}))
            .await
            .unwrap();

        let err = store
            .insert_one(Collection::Users, json!({"username": "ada", "password_digest": "b"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { key: "username", .. }));
        assert_eq!(store.write_count(Collection::Users), 1);
        assert_eq!(store.documents(Collection::Users)[0]["password_digest"], "a");
    }

    #[tokio::test]
    async fn test_candidates_allow_duplicates() {
        let store = MemoryDocumentStore::new();
        for _ in 0..2 {
            store
                .insert_one(Collection::Candidates, json!({"name": "Ada"}))
                .await
                .unwrap();
        }
        assert_eq!(store.write_count(Collection::Candidates), 2);
    }

    #[tokio::test]
    async fn test_find_in_empty_collection() {
        let store = MemoryDocumentStore::new();
        let found = store
            .find_one(Collection::Users, json!({"username": "nobody"}))
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
