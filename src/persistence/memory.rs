//! In-memory best-score store

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use super::{BestScoreRecord, BestScoreStore, StoreError};
use crate::consts::BEST_SCORE_ID;

/// Keeps the record in memory. Useful for tests and hosts without storage.
#[derive(Debug)]
pub struct MemoryStore {
    record: Mutex<Option<BestScoreRecord>>,
    tx: watch::Sender<Option<u32>>,
    /// Every score written, in order
    writes: Mutex<Vec<u32>>,
    fail_writes: AtomicBool,
    /// Hold back change notifications (simulates a slow subscription)
    publish: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store; subscribers immediately see a best of 0
    pub fn new() -> Self {
        Self::with_state(None, Some(0))
    }

    /// Store that already holds a best score
    pub fn with_best(score: u32) -> Self {
        Self::with_state(Some(BestScoreRecord::new(score)), Some(score))
    }

    /// Store whose subscription has not delivered anything yet
    pub fn unloaded() -> Self {
        Self::with_state(None, None)
    }

    fn with_state(record: Option<BestScoreRecord>, published: Option<u32>) -> Self {
        let (tx, _rx) = watch::channel(published);
        Self {
            record: Mutex::new(record),
            tx,
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            publish: AtomicBool::new(true),
        }
    }

    /// Current record
    pub fn record(&self) -> Option<BestScoreRecord> {
        *self.record.lock()
    }

    /// Scores written so far, oldest first
    pub fn writes(&self) -> Vec<u32> {
        self.writes.lock().clone()
    }

    /// Make subsequent upserts fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Pause or resume change notifications. Resuming publishes the current record.
    pub fn set_publish(&self, publish: bool) {
        self.publish.store(publish, Ordering::SeqCst);
        if publish {
            self.notify();
        }
    }

    fn notify(&self) {
        let best = self.record.lock().map_or(0, |r| r.score);
        self.tx.send_replace(Some(best));
    }
}

#[async_trait]
impl BestScoreStore for MemoryStore {
    fn subscribe(&self) -> watch::Receiver<Option<u32>> {
        self.tx.subscribe()
    }

    async fn upsert(&self, record: BestScoreRecord) -> Result<(), StoreError> {
        if record.id != BEST_SCORE_ID {
            return Err(StoreError::UnknownRecord(record.id));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }

        *self.record.lock() = Some(record);
        self.writes.lock().push(record.score);
        if self.publish.load(Ordering::SeqCst) {
            self.notify();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_publishes_zero() {
        let store = MemoryStore::new();
        assert_eq!(*store.subscribe().borrow(), Some(0));
        assert_eq!(*MemoryStore::unloaded().subscribe().borrow(), None);
        assert_eq!(*MemoryStore::with_best(90).subscribe().borrow(), Some(90));
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_notifies() {
        let store = MemoryStore::with_best(10);
        let mut rx = store.subscribe();

        store.upsert(BestScoreRecord::new(50)).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some(50));
        assert_eq!(store.record(), Some(BestScoreRecord::new(50)));
        assert_eq!(store.writes(), vec![50]);
    }

    #[tokio::test]
    async fn test_rejects_foreign_record() {
        let store = MemoryStore::new();
        let err = store
            .upsert(BestScoreRecord { id: 7, score: 5 })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownRecord(7)));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let err = store.upsert(BestScoreRecord::new(5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));
        assert_eq!(store.record(), None);
    }

    #[tokio::test]
    async fn test_held_back_notifications() {
        let store = MemoryStore::new();
        let rx = store.subscribe();
        store.set_publish(false);
        store.upsert(BestScoreRecord::new(30)).await.unwrap();
        assert_eq!(*rx.borrow(), Some(0));

        store.set_publish(true);
        assert_eq!(*rx.borrow(), Some(30));
    }
}
