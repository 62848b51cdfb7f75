//! OCR Types
//!
//! Defines types for the multi-page recognition pipeline.

use serde::{Deserialize, Serialize};

/// A single page image ready for recognition.
///
/// Either a direct image upload or one page of a rasterized PDF.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// File name for display and logging (e.g. "report_page_2.png")
    pub name: String,
    /// Encoded image bytes (PNG)
    pub data: Vec<u8>,
}

impl PageImage {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Per-page recognition state, updated live across one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Position in the page sequence (0-based, stable)
    pub index: usize,
    /// Current stage label reported by the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Fractional completion for this page, in [0.0, 1.0]
    pub progress: f64,
    /// Recognized text; present only once the page has completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PageResult {
    /// Placeholder entry delivered before any recognition work begins.
    pub fn pending(index: usize) -> Self {
        Self {
            index,
            status: Some("loading".to_string()),
            progress: 0.0,
            text: None,
        }
    }

    /// Whether this page has finished recognition.
    pub fn is_done(&self) -> bool {
        self.text.is_some()
    }
}

/// One progress event emitted by a recognition engine while processing
/// a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Named stage, e.g. "loading image", "recognizing text"
    pub stage: String,
    /// Fractional completion within this page, in [0.0, 1.0]
    pub progress: f64,
}

impl ProgressEvent {
    pub fn new(stage: impl Into<String>, progress: f64) -> Self {
        Self {
            stage: stage.into(),
            progress,
        }
    }
}

/// Mean fractional completion across all pages of the current run.
///
/// An empty sequence yields 0. Never panics on partially-populated
/// sequences.
pub fn aggregate_progress(pages: &[PageResult]) -> f64 {
    if pages.is_empty() {
        return 0.0;
    }
    let sum: f64 = pages.iter().map(|p| p.progress).sum();
    sum / pages.len() as f64
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("No recognition languages configured")]
    NoLanguages,

    #[error("Recognition engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("Engine release failed: {0}")]
    ReleaseFailed(String),
}

impl OcrError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::NoLanguages => StatusCode::BAD_REQUEST,
            Self::EngineNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
