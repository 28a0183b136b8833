//! Best-score persistence
//!
//! Stores hold exactly one record, keyed by a fixed identity. They expose:
//! - a push subscription carrying the current best on every change
//!   (`None` until the first value is known)
//! - an upsert that replaces the record
//!
//! Either may fail independently of the game; failures are reported here and
//! never reach the simulation.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::consts::BEST_SCORE_ID;

/// The single persisted best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScoreRecord {
    pub id: u32,
    pub score: u32,
}

impl BestScoreRecord {
    pub fn new(score: u32) -> Self {
        Self {
            id: BEST_SCORE_ID,
            score,
        }
    }
}

/// Persistence failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored best score is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("record id {0} does not match the best-score record")]
    UnknownRecord(u32),
    #[error("store unavailable")]
    Unavailable,
}

/// A store for the best score
#[async_trait]
pub trait BestScoreStore: Send + Sync {
    /// Receiver that observes the current best score. `None` means not loaded yet.
    fn subscribe(&self) -> watch::Receiver<Option<u32>>;

    /// Insert or replace the best-score record
    async fn upsert(&self, record: BestScoreRecord) -> Result<(), StoreError>;
}
