use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::error;

use super::{Collection, DocumentStore, StoreError};

/// Document store over a single JSONB table (see `migrations/`).
///
/// `find_one` uses JSONB containment (`body @> filter`), which agrees with
/// `matches_filter` for flat filters.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO documents (collection, body) VALUES ($1, $2)")
            .bind(collection.name())
            .bind(&document)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| {
                if let (sqlx::Error::Database(db), Some(key)) = (&e, collection.unique_key()) {
                    if db.is_unique_violation() {
                        return StoreError::Duplicate { collection, key };
                    }
                }
                error!("insert into {collection} failed: {e}");
                StoreError::from(e)
            })
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Value,
    ) -> Result<Option<Value>, StoreError> {
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(collection.name())
        .bind(&filter)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("find_one on {collection} failed: {e}");
            StoreError::from(e)
        })
    }
}
