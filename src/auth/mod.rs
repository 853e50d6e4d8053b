//! Optional shared-token authentication gate.
//!
//! Identity management is delegated to an external provider; this gate only
//! checks a shared bearer token when `API_AUTH_TOKEN` is configured. Without
//! a token the gate is disabled and every request passes, mirroring the
//! heuristic-fallback posture of the rest of the service.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ErrorResponse;

/// Extractor that enforces the gate when it is enabled.
#[derive(Debug, Clone)]
pub struct RequireAuth;

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Authentication required",
            AuthError::InvalidToken => "Invalid authorization token",
        };

        let body = ErrorResponse {
            success: false,
            message: message.to_string(),
            errors: Vec::new(),
        };

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.settings.api_auth_token.as_deref() else {
            // Gate disabled
            return Ok(RequireAuth);
        };

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        if token != expected {
            return Err(AuthError::InvalidToken);
        }

        Ok(RequireAuth)
    }
}
