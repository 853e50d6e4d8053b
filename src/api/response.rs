//! Standard API response envelope
//!
//! Every successful response uses the same wrapper:
//! `{statusCode, success, message, data, timestamp}`. Older clients read a
//! handful of fields at the top level as well (`article`, `titles`,
//! `rewritten`, ...); those are merged in through one explicit alias map at
//! the boundary rather than duplicated ad hoc inside each handler.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    pub data: T,
    pub timestamp: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: 200,
            success: true,
            message: message.into(),
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Merge legacy top-level convenience keys into the serialized envelope.
    /// Alias keys never shadow the canonical envelope fields.
    pub fn with_aliases(self, aliases: &[(&str, Value)]) -> Json<Value> {
        let mut body = serde_json::to_value(&self).unwrap_or_else(|_| Value::Null);
        if let Value::Object(map) = &mut body {
            for (key, value) in aliases {
                if !map.contains_key(*key) {
                    map.insert((*key).to_string(), value.clone());
                }
            }
        }
        Json(body)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_canonical_fields() {
        let env = Envelope::ok("done", json!({"answer": 42}));
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "done");
        assert_eq!(value["data"]["answer"], 42);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn aliases_are_merged_without_shadowing() {
        let env = Envelope::ok("done", json!({"x": 1}));
        let Json(body) = env.with_aliases(&[
            ("result", json!("hello")),
            ("message", json!("should not overwrite")),
        ]);

        assert_eq!(body["result"], "hello");
        assert_eq!(body["message"], "done");
        assert_eq!(body["data"]["x"], 1);
    }
}
