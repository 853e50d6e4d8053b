//! HTTP route handlers.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::UploadedFile;
use crate::services::media_store::StoredObject;

pub mod assistant;
pub mod classification;
pub mod detection;
pub mod generation;
pub mod health;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/ai/detect", post(detection::detect_content))
        .route("/api/generate/article", post(generation::generate_article))
        .route("/api/generate/titles", post(generation::generate_titles))
        .route("/api/generate/quotes", post(generation::generate_quotes))
        .route("/api/generate/rewrite", post(generation::rewrite_text))
        .route("/api/classify/ticket", post(classification::classify_ticket))
        .route("/api/classify/resume", post(classification::analyze_resume))
        .route(
            "/api/classify/sentiment",
            post(classification::analyze_sentiment),
        )
        .route("/api/assistant/respond", post(assistant::respond_assistant))
}

/// Push an upload to the media store when it is enabled. A disabled store
/// skips the step; a failed upload is a hard error.
pub(crate) async fn store_upload(
    state: &AppState,
    file: &UploadedFile,
    folder: &str,
) -> ApiResult<Option<StoredObject>> {
    if !state.media.should_upload() {
        return Ok(None);
    }
    match state.media.upload(file.bytes.clone(), folder, &file.name).await {
        Ok(stored) => Ok(Some(stored)),
        Err(e) => {
            tracing::error!(error = %e, "Media upload failed");
            Err(ApiError::Internal(
                e.context("Failed to upload file to cloud storage"),
            ))
        }
    }
}
