//! Document extraction
//!
//! Top-level upload pipeline: validation, rasterization, optional
//! filtering, OCR orchestration and upload-log annotation.

mod service;
mod types;

pub use service::ExtractionService;
pub use types::{
    is_valid_file_type, ExtractError, ExtractionOptions, ExtractionResponse, UploadedFile,
    MAX_FILE_SIZE,
};
