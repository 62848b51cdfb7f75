//! Extraction pipeline types

use serde::{Deserialize, Serialize};

use crate::filter::FilterError;
use crate::ocr::{OcrError, PageResult};
use crate::pdf::RasterError;

/// Maximum accepted upload size (50 MiB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Check if file type is allowed
pub fn is_valid_file_type(mime_type: &str) -> bool {
    matches!(mime_type, "application/pdf" | "image/png" | "image/jpeg")
}

/// One uploaded file, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Per-request extraction options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionOptions {
    /// Requested recognition languages; an empty set is resolved by the
    /// configured language policy
    #[serde(default)]
    pub languages: Vec<String>,
    /// Apply the monochrome threshold filter before recognition
    #[serde(default)]
    pub monochrome: bool,
}

/// Final result of one extraction run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub filename: String,
    /// Per-page recognition results, index-aligned with the page sequence
    pub pages: Vec<PageResult>,
    /// All page texts joined in order
    pub text: String,
    /// Mean per-page progress (1.0 after a successful run)
    pub aggregate_progress: f64,
    /// Data URLs of the filtered pages, present when the filter ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_pages: Option<Vec<String>>,
}

/// Extraction error taxonomy.
///
/// Input rejections happen before any processing and leave no engine or
/// log side effects; rasterization and recognition failures abort the run
/// and are recorded in the upload log by the service.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("No file provided")]
    MissingFile,

    #[error("Malformed upload request: {0}")]
    InvalidRequest(String),

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Unsupported file type: {0}")]
    InvalidFileType(String),

    #[error("No recognition language selected")]
    NoLanguages,

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::MissingFile | Self::InvalidRequest(_) | Self::InvalidFileType(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NoLanguages => StatusCode::BAD_REQUEST,
            Self::Raster(_) | Self::Filter(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Ocr(e) => e.status_code(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
