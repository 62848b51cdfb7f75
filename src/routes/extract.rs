//! Extraction routes
//!
//! Endpoint:
//! - POST /api/v1/extract - multipart upload, runs the OCR pipeline
//!
//! Multipart fields: `file` (the document), `languages` (comma-separated
//! language codes, optional), `monochrome` ("true"/"1"/"on" to enable the
//! threshold filter).

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::extract::{ExtractError, ExtractionOptions, ExtractionResponse, UploadedFile};
use crate::state::AppState;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = match &self {
            ExtractError::MissingFile => "MISSING_FILE",
            ExtractError::InvalidRequest(_) => "INVALID_REQUEST",
            ExtractError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ExtractError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            ExtractError::NoLanguages => "NO_LANGUAGES",
            ExtractError::Raster(_) => "RASTERIZATION_FAILED",
            ExtractError::Filter(_) => "FILTER_FAILED",
            ExtractError::Ocr(_) => "RECOGNITION_FAILED",
            ExtractError::Internal(_) => "INTERNAL_ERROR",
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Create the extraction router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(extract))
}

/// POST /api/v1/extract
async fn extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, ExtractError> {
    let mut file: Option<UploadedFile> = None;
    let mut options = ExtractionOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ExtractError::InvalidRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&name).first_or_octet_stream().to_string()
                    });
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ExtractError::InvalidRequest(e.to_string()))?
                    .to_vec();
                file = Some(UploadedFile {
                    name,
                    content_type,
                    data,
                });
            }
            "languages" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ExtractError::InvalidRequest(e.to_string()))?;
                options.languages = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "monochrome" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ExtractError::InvalidRequest(e.to_string()))?;
                options.monochrome = matches!(raw.trim(), "true" | "1" | "on");
            }
            _ => {}
        }
    }

    let file = file.ok_or(ExtractError::MissingFile)?;
    let response = state.extractor().extract(file, options).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    use crate::config::{Config, LanguagePolicy};
    use crate::extract::ExtractionService;
    use crate::ocr::{
        EngineFactory, OcrError, PageImage, ProgressSink, RecognitionEngine,
    };
    use crate::uploadlog::UploadLog;

    use super::*;

    struct EchoEngine;

    #[async_trait]
    impl RecognitionEngine for EchoEngine {
        async fn recognize(
            &mut self,
            image: &PageImage,
            _sink: &mut dyn ProgressSink,
        ) -> Result<String, OcrError> {
            Ok(format!("text of {}", image.name))
        }

        async fn release(&mut self) -> Result<(), OcrError> {
            Ok(())
        }
    }

    struct EchoFactory;

    #[async_trait]
    impl EngineFactory for EchoFactory {
        async fn create(
            &self,
            _languages: &[String],
        ) -> Result<Box<dyn RecognitionEngine>, OcrError> {
            Ok(Box::new(EchoEngine))
        }
    }

    fn server(dir: &tempfile::TempDir) -> TestServer {
        let log = UploadLog::new(dir.path().join("logs.json"));
        let state = AppState::with_parts(
            Config::default(),
            log.clone(),
            ExtractionService::new(Arc::new(EchoFactory), log, LanguagePolicy::Reject),
        );
        let app = Router::new()
            .nest("/api/v1/extract", router())
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        use std::io::Cursor;
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(2, 2))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    #[tokio::test]
    async fn image_upload_returns_page_results() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);

        let form = MultipartForm::new()
            .add_part(
                "file",
                Part::bytes(png_bytes())
                    .file_name("scan.png")
                    .mime_type("image/png"),
            )
            .add_text("languages", "por,eng");

        let response = server.post("/api/v1/extract").multipart(form).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["filename"], "scan.png");
        assert_eq!(body["aggregateProgress"], 1.0);
        assert_eq!(body["pages"][0]["text"], "text of scan.png");
    }

    #[tokio::test]
    async fn missing_file_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);

        let form = MultipartForm::new().add_text("languages", "por");
        let response = server.post("/api/v1/extract").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "MISSING_FILE");
    }

    #[tokio::test]
    async fn empty_language_selection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(png_bytes())
                .file_name("scan.png")
                .mime_type("image/png"),
        );
        let response = server.post("/api/v1/extract").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "NO_LANGUAGES");
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);

        let form = MultipartForm::new()
            .add_part(
                "file",
                Part::bytes(b"hello".to_vec())
                    .file_name("notes.txt")
                    .mime_type("text/plain"),
            )
            .add_text("languages", "por");
        let response = server.post("/api/v1/extract").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_FILE_TYPE");
    }
}
