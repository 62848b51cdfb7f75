//! Upload log routes
//!
//! Endpoints:
//! - POST /api/v1/log - record one upload attempt
//! - GET  /api/v1/log - list all recorded attempts
//!
//! Write failures are deliberately swallowed: the endpoint responds
//! success-ish even when the file write fails, so logging problems never
//! surface to the end user.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;
use crate::uploadlog::LogEntry;

/// Create the upload log router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_log).get(list_logs))
}

#[derive(Debug, Deserialize)]
struct CreateLogRequest {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    size: u64,
    #[serde(default, rename = "type")]
    content_type: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    language: Vec<String>,
}

/// POST /api/v1/log
async fn create_log(
    State(state): State<AppState>,
    Json(request): Json<CreateLogRequest>,
) -> impl IntoResponse {
    if request.filename.is_empty()
        || request.size == 0
        || request.content_type.is_empty()
        || request.language.is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "Required fields: filename, size, type, language."
            })),
        )
            .into_response();
    }

    let entry = LogEntry::now(
        request.filename,
        request.size,
        request.content_type,
        request.status,
        request.language,
    );

    match state.upload_log().append(entry.clone()).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "entry": entry })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Upload log write failed");
            (
                StatusCode::OK,
                Json(json!({ "message": "Log recorded." })),
            )
                .into_response()
        }
    }
}

/// GET /api/v1/log
async fn list_logs(State(state): State<AppState>) -> impl IntoResponse {
    let logs = state.upload_log().read_all().await;
    Json(json!({ "count": logs.len(), "logs": logs }))
}
