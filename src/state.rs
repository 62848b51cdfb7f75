//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::extract::ExtractionService;
use crate::ocr::TesseractFactory;
use crate::uploadlog::UploadLog;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    upload_log: UploadLog,
    extractor: ExtractionService,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Self {
        let upload_log = UploadLog::new(&config.log_file);
        let factory = Arc::new(TesseractFactory::new(&config.tesseract_binary));
        let extractor = ExtractionService::new(
            factory,
            upload_log.clone(),
            config.language_policy.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                upload_log,
                extractor,
            }),
        }
    }

    /// State wired to an explicit extraction service, for tests.
    #[cfg(test)]
    pub fn with_parts(config: Config, upload_log: UploadLog, extractor: ExtractionService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                upload_log,
                extractor,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn upload_log(&self) -> &UploadLog {
        &self.inner.upload_log
    }

    pub fn extractor(&self) -> &ExtractionService {
        &self.inner.extractor
    }
}
