//! OCR Module
//!
//! Multi-page recognition orchestration with live progress reporting.
//!
//! The orchestrator walks an ordered page-image sequence with one engine
//! instance per run, delivering a fresh full-sequence snapshot to the
//! consumer on every progress event and page completion.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docscan_server::ocr::{self, TesseractFactory};
//!
//! let factory = TesseractFactory::default();
//! let languages = vec!["por".to_string()];
//! let pages = ocr::run(&factory, &images, &languages, &mut |snapshot| {
//!     let pct = ocr::aggregate_progress(&snapshot) * 100.0;
//!     tracing::debug!("{:.0}% done", pct);
//! }).await?;
//! ```

mod engine;
mod orchestrator;
mod types;

pub use engine::{EngineFactory, ProgressSink, RecognitionEngine, TesseractEngine, TesseractFactory};
pub use orchestrator::run;
pub use types::{aggregate_progress, OcrError, PageImage, PageResult, ProgressEvent};
