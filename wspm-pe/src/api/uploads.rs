//! Simulated audio upload endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::uploads::{BatchRejection, FileDescriptor, UploadSnapshot, UploadedFile};
use crate::AppState;

/// POST /api/uploads request
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub files: Vec<FileDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub processing: bool,
    pub files: usize,
}

/// POST /api/uploads
///
/// Returns 202 Accepted; rejected files are listed with status `error`.
pub async fn submit_uploads(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    if request.files.is_empty() {
        return Err(ApiError::BadRequest("no files given".to_string()));
    }

    let files = state.uploads.submit(request.files).await;
    Ok((StatusCode::ACCEPTED, Json(UploadResponse { files })))
}

/// GET /api/uploads
pub async fn list_uploads(State(state): State<AppState>) -> Json<UploadSnapshot> {
    Json(state.uploads.snapshot().await)
}

/// POST /api/uploads/process
///
/// Starts the batch over completed uploads (409 Conflict while one is running).
pub async fn process_uploads(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<ProcessResponse>)> {
    match state.uploads.process_all().await {
        Ok(files) => Ok((
            StatusCode::ACCEPTED,
            Json(ProcessResponse {
                processing: true,
                files,
            }),
        )),
        Err(BatchRejection::AlreadyRunning) => Err(ApiError::Conflict(
            "batch processing already running".to_string(),
        )),
        Err(BatchRejection::NothingCompleted) => Err(ApiError::BadRequest(
            "no completed uploads to process".to_string(),
        )),
    }
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/uploads", get(list_uploads).post(submit_uploads))
        .route("/api/uploads/process", post(process_uploads))
}
