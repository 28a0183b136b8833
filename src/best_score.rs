//! Best-score reconciliation
//!
//! Decides whether a finished game beat the persisted best and, if so, hands
//! the write to the store in the background. The decision and the score it is
//! about are captured before anything is spawned, so the caller is free to reset
//! the session immediately afterwards.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::persistence::{BestScoreRecord, BestScoreStore};

/// Outcome of a reconcile call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// A write of `score` was issued
    Write { score: u32, previous_best: u32 },
    /// Score did not beat the mirrored best
    NotHigher { best: u32 },
    /// An equal or higher score is already on its way to the store
    AlreadyPending { pending: u32 },
    /// The store has not reported a best yet; writes are suppressed so a
    /// higher historical best is never overwritten
    BestUnknown,
}

impl ReconcileDecision {
    pub fn is_write(&self) -> bool {
        matches!(self, ReconcileDecision::Write { .. })
    }
}

pub struct BestScoreReconciler {
    store: Arc<dyn BestScoreStore>,
    /// Local copy of the persisted best, fed by the store's subscription
    mirror: watch::Receiver<Option<u32>>,
    /// Highest score issued to the store that the mirror has not caught up with
    pending: Arc<Mutex<Option<u32>>>,
    /// Held for the duration of each upsert so writes land one at a time
    write_gate: Arc<tokio::sync::Mutex<()>>,
    runtime: Handle,
}

impl std::fmt::Debug for BestScoreReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BestScoreReconciler")
            .field("mirrored_best", &self.mirrored_best())
            .field("pending", &*self.pending.lock())
            .finish_non_exhaustive()
    }
}

impl BestScoreReconciler {
    /// Subscribes to the store immediately. Writes are spawned on `runtime`.
    pub fn new(store: Arc<dyn BestScoreStore>, runtime: Handle) -> Self {
        let mirror = store.subscribe();
        Self {
            store,
            mirror,
            pending: Arc::new(Mutex::new(None)),
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
            runtime,
        }
    }

    /// Last best score the store reported
    pub fn mirrored_best(&self) -> Option<u32> {
        *self.mirror.borrow()
    }

    /// A receiver following the mirrored best
    pub fn watch(&self) -> watch::Receiver<Option<u32>> {
        self.mirror.clone()
    }

    /// Compare a final score with the mirrored best and persist it if higher.
    ///
    /// Never blocks on the store. Writes are serialized and a write that has
    /// been overtaken by a higher pending score is skipped, so the store only
    /// ever moves upwards. A failed write is logged and forgotten, which lets a
    /// later game try again.
    pub fn reconcile(&self, final_score: u32) -> ReconcileDecision {
        let Some(best) = self.mirrored_best() else {
            log::info!("Best score not loaded yet, not saving {}", final_score);
            return ReconcileDecision::BestUnknown;
        };

        let mut pending = self.pending.lock();
        if pending.is_some_and(|p| best >= p) {
            *pending = None;
        }
        if final_score <= best {
            log::debug!("Score {} does not beat best {}", final_score, best);
            return ReconcileDecision::NotHigher { best };
        }
        if let Some(p) = *pending {
            if final_score <= p {
                return ReconcileDecision::AlreadyPending { pending: p };
            }
        }
        *pending = Some(final_score);
        drop(pending);

        log::info!("New best score {} (was {})", final_score, best);
        let store = Arc::clone(&self.store);
        let pending = Arc::clone(&self.pending);
        let write_gate = Arc::clone(&self.write_gate);
        self.runtime.spawn(async move {
            let _gate = write_gate.lock().await;
            if pending.lock().is_some_and(|p| p > final_score) {
                log::debug!("Best score {} superseded before it was written", final_score);
                return;
            }
            if let Err(err) = store.upsert(BestScoreRecord::new(final_score)).await {
                log::warn!("Best score {} was not saved: {}", final_score, err);
                let mut pending = pending.lock();
                if *pending == Some(final_score) {
                    *pending = None;
                }
            }
        });

        ReconcileDecision::Write {
            score: final_score,
            previous_best: best,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::persistence::{MemoryStore, StoreError};

    /// Store that takes a while to write anything below `slow_below`
    struct SlowLowStore {
        inner: MemoryStore,
        slow_below: u32,
    }

    #[async_trait]
    impl BestScoreStore for SlowLowStore {
        fn subscribe(&self) -> watch::Receiver<Option<u32>> {
            self.inner.subscribe()
        }

        async fn upsert(&self, record: BestScoreRecord) -> Result<(), StoreError> {
            if record.score < self.slow_below {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.inner.upsert(record).await
        }
    }

    /// Let spawned store writes run to completion
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_higher_score_is_written() {
        let store = Arc::new(MemoryStore::with_best(20));
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        let decision = reconciler.reconcile(50);
        assert_eq!(
            decision,
            ReconcileDecision::Write {
                score: 50,
                previous_best: 20
            }
        );
        settle().await;
        assert_eq!(store.writes(), vec![50]);
        assert_eq!(reconciler.mirrored_best(), Some(50));
    }

    #[tokio::test]
    async fn test_lower_or_equal_score_is_not_written() {
        let store = Arc::new(MemoryStore::with_best(50));
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        assert_eq!(reconciler.reconcile(50), ReconcileDecision::NotHigher { best: 50 });
        assert_eq!(reconciler.reconcile(10), ReconcileDecision::NotHigher { best: 50 });
        settle().await;
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_reconcile_writes_once() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        assert!(reconciler.reconcile(40).is_write());
        settle().await;
        assert_eq!(reconciler.reconcile(40), ReconcileDecision::NotHigher { best: 40 });
        settle().await;
        assert_eq!(store.writes(), vec![40]);
    }

    #[tokio::test]
    async fn test_lagging_mirror_does_not_duplicate_or_regress() {
        let store = Arc::new(MemoryStore::new());
        store.set_publish(false);
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        assert!(reconciler.reconcile(60).is_write());
        settle().await;
        // Mirror still reports 0
        assert_eq!(reconciler.mirrored_best(), Some(0));
        assert_eq!(
            reconciler.reconcile(60),
            ReconcileDecision::AlreadyPending { pending: 60 }
        );
        assert_eq!(
            reconciler.reconcile(30),
            ReconcileDecision::AlreadyPending { pending: 60 }
        );
        assert!(reconciler.reconcile(70).is_write());
        settle().await;
        assert_eq!(store.writes(), vec![60, 70]);

        store.set_publish(true);
        assert_eq!(reconciler.reconcile(70), ReconcileDecision::NotHigher { best: 70 });
    }

    #[tokio::test]
    async fn test_unknown_best_suppresses_writes() {
        let store = Arc::new(MemoryStore::unloaded());
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        assert_eq!(reconciler.reconcile(100), ReconcileDecision::BestUnknown);
        settle().await;
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_allows_retry() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        assert!(reconciler.reconcile(30).is_write());
        settle().await;
        assert!(store.writes().is_empty());

        store.set_fail_writes(false);
        assert!(reconciler.reconcile(30).is_write());
        settle().await;
        assert_eq!(store.writes(), vec![30]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_write_is_not_overtaken() {
        let store = Arc::new(SlowLowStore {
            inner: MemoryStore::new(),
            slow_below: 70,
        });
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        assert!(reconciler.reconcile(60).is_write());
        // Let the 60 write get stuck inside the store
        settle().await;
        assert!(reconciler.reconcile(70).is_write());

        tokio::time::sleep(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(store.inner.writes(), vec![60, 70]);
        assert_eq!(reconciler.mirrored_best(), Some(70));

        assert_eq!(reconciler.reconcile(65), ReconcileDecision::NotHigher { best: 70 });
        assert!(reconciler.reconcile(75).is_write());
        settle().await;
        assert_eq!(store.inner.writes(), vec![60, 70, 75]);
    }

    #[tokio::test]
    async fn test_superseded_write_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = BestScoreReconciler::new(store.clone(), Handle::current());

        // Both issued before either task runs
        assert!(reconciler.reconcile(60).is_write());
        assert!(reconciler.reconcile(70).is_write());
        settle().await;
        assert_eq!(store.writes(), vec![70]);
        assert_eq!(reconciler.mirrored_best(), Some(70));
        assert_eq!(reconciler.reconcile(65), ReconcileDecision::NotHigher { best: 70 });
    }
}
