//! Best-score store backed by a JSON file
//!
//! Writes go to a temporary sibling file which is then renamed over the save,
//! so a crash mid-write leaves the previous best intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};

use super::{BestScoreRecord, BestScoreStore, StoreError};
use crate::consts::BEST_SCORE_ID;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tx: watch::Sender<Option<u32>>,
    /// Serializes writers so renames land in upsert order
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, loading the current best. A missing file is a best of 0.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let best = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record: BestScoreRecord = serde_json::from_slice(&bytes)?;
                if record.id != BEST_SCORE_ID {
                    return Err(StoreError::UnknownRecord(record.id));
                }
                log::info!("Loaded best score {} from {}", record.score, path.display());
                record.score
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No best score at {}, starting fresh", path.display());
                0
            }
            Err(err) => return Err(err.into()),
        };

        let (tx, _rx) = watch::channel(Some(best));
        Ok(Self {
            path,
            tx,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write(&self, record: &BestScoreRecord) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(record)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl BestScoreStore for JsonFileStore {
    fn subscribe(&self) -> watch::Receiver<Option<u32>> {
        self.tx.subscribe()
    }

    async fn upsert(&self, record: BestScoreRecord) -> Result<(), StoreError> {
        if record.id != BEST_SCORE_ID {
            return Err(StoreError::UnknownRecord(record.id));
        }

        let _guard = self.write_lock.lock().await;
        if let Err(err) = self.write(&record).await {
            log::warn!("Failed to save best score to {}: {}", self.path.display(), err);
            return Err(err);
        }

        log::info!("Best score {} saved", record.score);
        self.tx.send_replace(Some(record.score));
        Ok(())
    }
}
