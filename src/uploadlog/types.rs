//! Upload log types

use serde::{Deserialize, Serialize};

/// Status value recorded for a successful upload.
pub const STATUS_OK: &str = "";
/// Status value recorded when extraction failed.
pub const STATUS_ERROR: &str = "erro";

/// One upload attempt, as stored in the log file.
///
/// Field names are part of the on-disk/wire format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp of the attempt
    pub timestamp: String,
    pub filename: String,
    /// File size in bytes
    pub size: u64,
    /// MIME type of the uploaded file
    #[serde(rename = "type")]
    pub content_type: String,
    /// "" on success, "erro" on failure
    pub status: String,
    /// Language codes the run was configured with
    pub language: Vec<String>,
}

impl LogEntry {
    /// Build an entry stamped with the current time.
    pub fn now(
        filename: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        status: impl Into<String>,
        language: Vec<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            filename: filename.into(),
            size,
            content_type: content_type.into(),
            status: status.into(),
            language,
        }
    }
}
