//! Append-only message log backed by a single text file.

use super::types::StoreError;
use std::path::{Path, PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// Handle to the durable, append-only message log.
///
/// Writes from the same process are serialized through an internal mutex; writers in other
/// processes rely on the platform's append-mode semantics.
#[derive(Debug)]
pub struct AppendLogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AppendLogStore {
    /// Create a handle for the log at `path`. The file is created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one formatted line and flush it to durable storage before returning.
    pub async fn append(&self, line: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        file.sync_all()
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        tracing::debug!(path = %self.path.display(), bytes = line.len(), "Appended log line");
        Ok(())
    }

    /// Read the whole log and return its non-empty lines in append order.
    ///
    /// Every call re-reads the file, so the result always reflects the latest appends. Bytes that
    /// are not valid UTF-8 become U+FFFD instead of failing the whole read.
    pub async fn read_all(&self) -> Result<Vec<String>, StoreError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        let contents = String::from_utf8_lossy(&raw);
        let lines: Vec<String> = contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        tracing::debug!(path = %self.path.display(), lines = lines.len(), "Read message log");
        Ok(lines)
    }
}
