//! Shared helpers for integration tests. The app is built from offline
//! settings, so every model-backed operation takes its deterministic
//! fallback path and assertions stay stable.

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use textsmith_backend::app::{create_app, AppState};
use textsmith_backend::config::Settings;
use textsmith_backend::services::{MediaStore, ModelGateway};

pub fn offline_app() -> Router {
    let settings = Settings::offline();
    let gateway = ModelGateway::new(&settings).unwrap();
    let media = MediaStore::new(&settings).unwrap();
    create_app(AppState::new(settings, gateway, media))
}

pub async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    split_response(response).await
}

pub async fn split_response(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

/// Hand-rolled multipart body: one optional file part plus text fields.
pub fn multipart_body(
    boundary: &str,
    file: Option<(&str, &str, &[u8])>,
    fields: &[(&str, &str)],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, mime, bytes)) = file {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: Router,
    path: &str,
    file: Option<(&str, &str, &[u8])>,
    fields: &[(&str, &str)],
) -> (StatusCode, Value) {
    let boundary = "test-boundary-7431";
    let body = multipart_body(boundary, file, fields);
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    split_response(response).await
}
