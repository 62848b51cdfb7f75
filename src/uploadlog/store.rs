//! Flat-file upload log store
//!
//! One JSON array in a single file, rewritten in full on every append. An
//! absent or unparsable file reads as an empty log. There is no file
//! locking: concurrent writers can race and lose updates, an accepted gap
//! at the expected single-user volume.

use std::path::{Path, PathBuf};

use super::types::LogEntry;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to write log file: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize log entries: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Handle on the upload log file.
#[derive(Clone)]
pub struct UploadLog {
    path: PathBuf,
}

impl UploadLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the full log. Absent or corrupt files read as empty.
    pub async fn read_all(&self) -> Vec<LogEntry> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Unparsable log file, treating as empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }

    /// Append one entry by rewriting the whole file.
    pub async fn append(&self, entry: LogEntry) -> Result<(), LogError> {
        let mut entries = self.read_all().await;
        entries.push(entry);
        let data = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}
