//! Axum route handlers for the Resume Analysis API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::analysis::orchestrator::AnalysisSnapshot;
use crate::errors::AppError;
use crate::extract::UploadedDocument;
use crate::state::AppState;

/// Multipart field carrying the resume file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub helpful: bool,
}

/// POST /api/v1/resume/analysis
///
/// Accepts a resume upload and starts an analysis run.
/// Returns 202 with the session snapshot; poll GET for progress and results.
pub async fn handle_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AnalysisSnapshot>), AppError> {
    let limit = state.analysis.max_upload_bytes();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit, "Invalid multipart body"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit, "Failed to read upload"))?;

        let snapshot = state.analysis.submit(UploadedDocument {
            file_name,
            content_type,
            data,
        })?;
        return Ok((StatusCode::ACCEPTED, Json(snapshot)));
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

/// Body-limit rejections surface as `FileTooLarge`; anything else is a malformed request.
fn multipart_error(e: MultipartError, limit: usize, context: &str) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { limit }
    } else {
        AppError::Validation(format!("{context}: {e}"))
    }
}

/// GET /api/v1/resume/analysis
pub async fn handle_get_analysis(State(state): State<AppState>) -> Json<AnalysisSnapshot> {
    Json(state.analysis.snapshot())
}

/// DELETE /api/v1/resume/analysis
///
/// Cancels any in-flight run and discards results.
pub async fn handle_reset(State(state): State<AppState>) -> StatusCode {
    state.analysis.reset();
    StatusCode::NO_CONTENT
}

/// POST /api/v1/resume/analysis/recommendations/:id/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> Result<StatusCode, AppError> {
    state.analysis.record_feedback(&id, req.helpful)?;
    Ok(StatusCode::NO_CONTENT)
}
