//! Health/readiness endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::app::AppState;

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model_mode = if state.gateway.is_configured() {
        "live"
    } else {
        "fallback"
    };
    let media_mode = if state.media.should_upload() {
        "cloud"
    } else {
        "disabled"
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.settings.env.as_str(),
        "model": {
            "mode": model_mode,
            "chatModel": state.settings.chat_model,
            "detectorModel": state.settings.detector_model,
        },
        "media": { "mode": media_mode },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
