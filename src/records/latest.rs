//! Single-slot store holding the most recently posted message.

use super::types::{PostedMessage, StoreError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Handle to the latest-message slot.
///
/// Each save replaces the whole file. Writers and readers in this process take the same lock,
/// so an in-process reader never sees a half-written slot; a crash mid-write can still leave
/// the file truncated.
#[derive(Debug)]
pub struct LatestMessageStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LatestMessageStore {
    /// Create a handle for the slot at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `message` as one JSON object and overwrite the slot with it.
    pub async fn save(&self, message: &PostedMessage) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(message)?;
        let _guard = self.lock.lock().await;
        tokio::fs::write(&self.path, &payload)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        tracing::debug!(path = %self.path.display(), bytes = payload.len(), "Saved latest message");
        Ok(())
    }

    /// Return the slot's raw contents. A slot that was never written is an error.
    pub async fn load(&self) -> Result<Vec<u8>, StoreError> {
        let _guard = self.lock.lock().await;
        tokio::fs::read(&self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))
    }
}
