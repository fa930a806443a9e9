use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tracing::debug;

/// In-process session records with expiry-based pruning.
///
/// Expired records are hidden from `load` straight away and removed for good
/// by [`SessionRecords::delete_expired`].
#[derive(Debug, Clone, Default)]
pub struct SessionRecords {
    records: Arc<Mutex<HashMap<Id, Record>>>,
}

impl SessionRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every record past its expiry date and returns how many went.
    pub async fn delete_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| record.expiry_date > now);
        before - records.len()
    }

    /// Runs [`Self::delete_expired`] every `period`, forever.
    pub async fn prune_every(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = self.delete_expired().await;
            if removed > 0 {
                debug!("pruned {removed} expired sessions");
            }
        }
    }

    /// Number of records held, expired or not.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for SessionRecords {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .records
            .lock()
            .await
            .get(session_id)
            .filter(|record| record.expiry_date > now)
            .cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_sessions::cookie::time::Duration as TimeDuration;

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = SessionRecords::new();
        let live = record(TimeDuration::hours(1));
        store.save(&live).await.unwrap();

        let loaded = store.load(&live.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, live.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_record_is_not_loaded() {
        let store = SessionRecords::new();
        let stale = record(TimeDuration::seconds(-1));
        store.save(&stale).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_drops_only_stale_records() {
        let store = SessionRecords::new();
        let live = record(TimeDuration::hours(1));
        store.save(&live).await.unwrap();
        store.save(&record(TimeDuration::seconds(-1))).await.unwrap();
        store.save(&record(TimeDuration::minutes(-5))).await.unwrap();

        assert_eq!(store.delete_expired().await, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.load(&live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_avoids_id_collisions() {
        let store = SessionRecords::new();
        let first = record(TimeDuration::hours(1));
        store.save(&first).await.unwrap();

        let mut second = record(TimeDuration::hours(1));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(second.id, first.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = SessionRecords::new();
        let live = record(TimeDuration::hours(1));
        store.save(&live).await.unwrap();
        store.delete(&live.id).await.unwrap();
        assert_eq!(store.len().await, 0);
    }
}
