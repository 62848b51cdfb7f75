//! Extraction pipeline
//!
//! The top-level upload handler: validates the input, rasterizes PDFs,
//! optionally applies the monochrome filter, runs the OCR orchestrator and
//! records the attempt in the upload log.

use std::sync::Arc;

use crate::config::LanguagePolicy;
use crate::filter::{self, FilteredImage};
use crate::ocr::{self, aggregate_progress, EngineFactory, PageImage};
use crate::pdf;
use crate::uploadlog::{LogEntry, UploadLog, STATUS_ERROR, STATUS_OK};

use super::types::{
    is_valid_file_type, ExtractError, ExtractionOptions, ExtractionResponse, UploadedFile,
    MAX_FILE_SIZE,
};

/// Document extraction service.
#[derive(Clone)]
pub struct ExtractionService {
    factory: Arc<dyn EngineFactory>,
    log: UploadLog,
    language_policy: LanguagePolicy,
}

impl ExtractionService {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        log: UploadLog,
        language_policy: LanguagePolicy,
    ) -> Self {
        Self {
            factory,
            log,
            language_policy,
        }
    }

    /// Run the full pipeline for one upload.
    ///
    /// Input rejections (size, type, language policy) return before any
    /// processing and are not logged. Once processing starts, the attempt
    /// is always logged: status "" on success, "erro" on failure. A
    /// log-write failure is swallowed and never masks the outcome.
    pub async fn extract(
        &self,
        file: UploadedFile,
        options: ExtractionOptions,
    ) -> Result<ExtractionResponse, ExtractError> {
        let size = file.data.len() as u64;
        if size > MAX_FILE_SIZE {
            return Err(ExtractError::FileTooLarge {
                size,
                max: MAX_FILE_SIZE,
            });
        }
        if !is_valid_file_type(&file.content_type) {
            return Err(ExtractError::InvalidFileType(file.content_type.clone()));
        }

        let languages = self.resolve_languages(options.languages)?;

        tracing::info!(
            filename = %file.name,
            size,
            content_type = %file.content_type,
            languages = ?languages,
            monochrome = options.monochrome,
            "Starting extraction"
        );

        let outcome = self
            .run_pipeline(&file, &languages, options.monochrome)
            .await;

        let status = if outcome.is_ok() {
            STATUS_OK
        } else {
            STATUS_ERROR
        };
        let entry = LogEntry::now(
            file.name.clone(),
            size,
            file.content_type.clone(),
            status,
            languages,
        );
        if let Err(e) = self.log.append(entry).await {
            tracing::warn!(error = %e, "Failed to record upload log entry");
        }

        outcome
    }

    /// Resolve the effective language set according to the configured
    /// policy. Blank entries are discarded first.
    fn resolve_languages(&self, requested: Vec<String>) -> Result<Vec<String>, ExtractError> {
        let requested: Vec<String> = requested
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        if !requested.is_empty() {
            return Ok(requested);
        }
        match &self.language_policy {
            LanguagePolicy::Fallback(default) => Ok(vec![default.clone()]),
            LanguagePolicy::Reject => Err(ExtractError::NoLanguages),
        }
    }

    async fn run_pipeline(
        &self,
        file: &UploadedFile,
        languages: &[String],
        monochrome: bool,
    ) -> Result<ExtractionResponse, ExtractError> {
        // Multi-page documents get rasterized; single images pass through.
        let pages: Vec<PageImage> = if file.content_type == "application/pdf" {
            pdf::rasterize(file.data.clone(), &file.name).await?
        } else {
            vec![PageImage::new(file.name.clone(), file.data.clone())]
        };

        let (pages, filtered_urls) = if monochrome {
            let filtered = tokio::task::spawn_blocking(move || filter::apply(&pages))
                .await
                .map_err(|e| ExtractError::Internal(format!("Filter task failed: {}", e)))??;
            let urls = filtered.iter().map(|f| f.data_url.clone()).collect();
            let pages = filtered
                .into_iter()
                .map(FilteredImage::into_page_image)
                .collect();
            (pages, Some(urls))
        } else {
            (pages, None)
        };

        let mut on_update = |snapshot: Vec<ocr::PageResult>| {
            tracing::debug!(
                progress = format!("{:.1}%", aggregate_progress(&snapshot) * 100.0),
                pages_done = snapshot.iter().filter(|p| p.is_done()).count(),
                pages_total = snapshot.len(),
                "OCR progress"
            );
        };
        let results = ocr::run(self.factory.as_ref(), &pages, languages, &mut on_update).await?;

        let text = results
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(ExtractionResponse {
            filename: file.name.clone(),
            aggregate_progress: aggregate_progress(&results),
            pages: results,
            text,
            filtered_pages: filtered_urls,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use async_trait::async_trait;
    use image::{DynamicImage, RgbaImage};

    use crate::ocr::{OcrError, ProgressEvent, ProgressSink, RecognitionEngine};

    use super::*;

    struct FixedTextEngine {
        fail: bool,
    }

    #[async_trait]
    impl RecognitionEngine for FixedTextEngine {
        async fn recognize(
            &mut self,
            image: &PageImage,
            sink: &mut dyn ProgressSink,
        ) -> Result<String, OcrError> {
            if self.fail {
                return Err(OcrError::RecognitionFailed("scripted".to_string()));
            }
            sink.on_event(ProgressEvent::new("recognizing text", 0.5));
            Ok(format!("text of {}", image.name))
        }

        async fn release(&mut self) -> Result<(), OcrError> {
            Ok(())
        }
    }

    struct FixedTextFactory {
        fail: bool,
    }

    #[async_trait]
    impl EngineFactory for FixedTextFactory {
        async fn create(
            &self,
            _languages: &[String],
        ) -> Result<Box<dyn RecognitionEngine>, OcrError> {
            Ok(Box::new(FixedTextEngine { fail: self.fail }))
        }
    }

    fn service(dir: &tempfile::TempDir, fail: bool, policy: LanguagePolicy) -> ExtractionService {
        ExtractionService::new(
            Arc::new(FixedTextFactory { fail }),
            UploadLog::new(dir.path().join("logs.json")),
            policy,
        )
    }

    fn png_upload(name: &str) -> UploadedFile {
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(4, 4))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        UploadedFile {
            name: name.to_string(),
            content_type: "image/png".to_string(),
            data: png,
        }
    }

    fn options(languages: &[&str]) -> ExtractionOptions {
        ExtractionOptions {
            languages: languages.iter().map(|s| s.to_string()).collect(),
            monochrome: false,
        }
    }

    #[tokio::test]
    async fn image_upload_extracts_and_logs_success() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, false, LanguagePolicy::Reject);

        let response = svc
            .extract(png_upload("scan.png"), options(&["por"]))
            .await
            .unwrap();

        assert_eq!(response.pages.len(), 1);
        assert_eq!(response.text, "text of scan.png");
        assert_eq!(response.aggregate_progress, 1.0);

        let logs = UploadLog::new(dir.path().join("logs.json")).read_all().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, STATUS_OK);
        assert_eq!(logs[0].filename, "scan.png");
        assert_eq!(logs[0].language, vec!["por".to_string()]);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_without_logging() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, false, LanguagePolicy::Reject);

        let mut file = png_upload("big.png");
        file.data = vec![0u8; (MAX_FILE_SIZE + 1) as usize];

        let result = svc.extract(file, options(&["por"])).await;
        assert!(matches!(result, Err(ExtractError::FileTooLarge { .. })));
        assert!(UploadLog::new(dir.path().join("logs.json"))
            .read_all()
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_without_logging() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, false, LanguagePolicy::Reject);

        let mut file = png_upload("notes.txt");
        file.content_type = "text/plain".to_string();

        let result = svc.extract(file, options(&["por"])).await;
        assert!(matches!(result, Err(ExtractError::InvalidFileType(_))));
        assert!(UploadLog::new(dir.path().join("logs.json"))
            .read_all()
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn empty_languages_rejected_under_strict_policy() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, false, LanguagePolicy::Reject);

        let result = svc.extract(png_upload("scan.png"), options(&[])).await;
        assert!(matches!(result, Err(ExtractError::NoLanguages)));
        assert!(UploadLog::new(dir.path().join("logs.json"))
            .read_all()
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn empty_languages_resolved_by_fallback_policy() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            &dir,
            false,
            LanguagePolicy::Fallback("por".to_string()),
        );

        let response = svc.extract(png_upload("scan.png"), options(&[])).await.unwrap();
        assert_eq!(response.pages.len(), 1);

        let logs = UploadLog::new(dir.path().join("logs.json")).read_all().await;
        assert_eq!(logs[0].language, vec!["por".to_string()]);
    }

    #[tokio::test]
    async fn recognition_failure_is_logged_as_erro() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, true, LanguagePolicy::Reject);

        let result = svc.extract(png_upload("scan.png"), options(&["por"])).await;
        assert!(matches!(result, Err(ExtractError::Ocr(_))));

        let logs = UploadLog::new(dir.path().join("logs.json")).read_all().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, STATUS_ERROR);
    }

    #[tokio::test]
    async fn monochrome_flag_filters_pages_before_recognition() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, false, LanguagePolicy::Reject);

        let response = svc
            .extract(
                png_upload("scan.png"),
                ExtractionOptions {
                    languages: vec!["por".to_string()],
                    monochrome: true,
                },
            )
            .await
            .unwrap();

        let urls = response.filtered_pages.expect("filtered data urls");
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("data:image/png;base64,"));
        // Recognition saw the filtered page, not the original upload
        assert_eq!(response.text, "text of filtered_page_1.png");
    }

    #[tokio::test]
    async fn blank_language_entries_are_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, false, LanguagePolicy::Reject);

        let result = svc
            .extract(png_upload("scan.png"), options(&["  ", ""]))
            .await;
        assert!(matches!(result, Err(ExtractError::NoLanguages)));
    }
}
