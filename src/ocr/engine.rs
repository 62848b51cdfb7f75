//! Recognition Engines
//!
//! Defines the engine traits and the Tesseract-backed implementation.
//!
//! An engine is created once per language set for one orchestration run,
//! invoked sequentially for each page, and explicitly released afterwards.
//! While recognizing a page it reports named-stage fractional progress
//! through a [`ProgressSink`].

use async_trait::async_trait;

use super::types::{OcrError, PageImage, ProgressEvent};

/// Receiver for per-page progress events.
pub trait ProgressSink: Send {
    fn on_event(&mut self, event: ProgressEvent);
}

/// One recognition engine instance, configured for a fixed language set.
///
/// Single-flight: callers must not invoke `recognize` concurrently on one
/// instance. Dropping an engine without calling `release` may leak the
/// backend's resources.
#[async_trait]
pub trait RecognitionEngine: Send {
    /// Recognize text in one page image, reporting progress as it goes.
    async fn recognize(
        &mut self,
        image: &PageImage,
        sink: &mut dyn ProgressSink,
    ) -> Result<String, OcrError>;

    /// Release the engine's underlying resources.
    async fn release(&mut self) -> Result<(), OcrError>;
}

/// Factory for recognition engines, one per orchestration run.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Create an engine configured for `languages` (non-empty, pre-validated
    /// by the orchestrator).
    async fn create(&self, languages: &[String]) -> Result<Box<dyn RecognitionEngine>, OcrError>;
}

/// Factory producing Tesseract CLI engines.
pub struct TesseractFactory {
    /// Tesseract binary name or path
    binary: String,
}

impl TesseractFactory {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    /// Check if the tesseract binary is runnable
    fn is_available(&self) -> bool {
        std::process::Command::new(&self.binary)
            .arg("--version")
            .output()
            .is_ok()
    }
}

impl Default for TesseractFactory {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl EngineFactory for TesseractFactory {
    async fn create(&self, languages: &[String]) -> Result<Box<dyn RecognitionEngine>, OcrError> {
        if !self.is_available() {
            return Err(OcrError::EngineNotAvailable(format!(
                "{} is not installed or not on PATH",
                self.binary
            )));
        }

        Ok(Box::new(TesseractEngine {
            binary: self.binary.clone(),
            languages: languages.join("+"),
        }))
    }
}

/// Tesseract CLI engine
///
/// The CLI does not stream recognition progress, so this engine emits the
/// stage boundaries it does know: image staging, recognition start and
/// recognition end.
pub struct TesseractEngine {
    binary: String,
    /// Languages joined with '+' as tesseract expects (e.g. "por+eng")
    languages: String,
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    async fn recognize(
        &mut self,
        image: &PageImage,
        sink: &mut dyn ProgressSink,
    ) -> Result<String, OcrError> {
        use std::process::Command;

        sink.on_event(ProgressEvent::new("loading image", 0.0));

        // Stage the image in a temp file for the CLI
        let temp_dir = std::env::temp_dir();
        let input_path = temp_dir.join(format!("ocr_input_{}.png", uuid::Uuid::new_v4()));
        let output_path = temp_dir.join(format!("ocr_output_{}", uuid::Uuid::new_v4()));

        std::fs::write(&input_path, &image.data)
            .map_err(|e| OcrError::RecognitionFailed(format!("Failed to write temp file: {}", e)))?;

        sink.on_event(ProgressEvent::new("recognizing text", 0.0));

        let output = Command::new(&self.binary)
            .arg(&input_path)
            .arg(&output_path)
            .arg("-l")
            .arg(&self.languages)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .output()
            .map_err(|e| OcrError::RecognitionFailed(format!("Failed to run tesseract: {}", e)));

        // Clean up input file before inspecting the outcome
        let _ = std::fs::remove_file(&input_path);
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::RecognitionFailed(format!(
                "Tesseract failed on {}: {}",
                image.name, stderr
            )));
        }

        let output_file = format!("{}.txt", output_path.display());
        let text = std::fs::read_to_string(&output_file)
            .map_err(|e| OcrError::RecognitionFailed(format!("Failed to read output: {}", e)))?;
        let _ = std::fs::remove_file(&output_file);

        sink.on_event(ProgressEvent::new("recognizing text", 1.0));

        Ok(text.trim().to_string())
    }

    async fn release(&mut self) -> Result<(), OcrError> {
        // The CLI engine holds nothing between invocations
        Ok(())
    }
}
