//! End-to-end tests over the JSON endpoints with no model configured, so
//! every response comes from the deterministic fallback paths.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{offline_app, post_json};

fn envelope_ok(body: &serde_json::Value) {
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_fallback_mode() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = offline_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body) = common::split_response(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"]["mode"], "fallback");
    assert_eq!(body["media"]["mode"], "disabled");
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn detect_returns_complementary_probabilities_and_verdict() {
    let text = "The committee reviewed every proposal carefully before making a final \
                decision about next year's funding priorities and timelines.";
    let (status, body) = post_json(offline_app(), "/api/ai/detect", json!({ "text": text })).await;

    assert_eq!(status, StatusCode::OK);
    envelope_ok(&body);

    let detection = &body["data"]["detection"];
    let ai = detection["aiProbability"].as_f64().unwrap();
    let human = detection["humanProbability"].as_f64().unwrap();
    assert!((ai + human - 1.0).abs() < 1e-3);

    let verdict = detection["verdict"].as_str().unwrap();
    assert!([
        "Likely AI-Generated",
        "Possibly Mixed Content",
        "Likely Human-Written"
    ]
    .contains(&verdict));

    assert_eq!(body["data"]["indicators"].as_array().unwrap().len(), 4);
    let metrics = &body["data"]["analysis"];
    for key in ["sentenceComplexity", "vocabularyDiversity", "naturalFlow"] {
        let v = metrics[key].as_u64().unwrap();
        assert!(v <= 100, "{key} out of range: {v}");
    }
}

#[tokio::test]
async fn detect_rejects_short_and_missing_text() {
    let (status, body) = post_json(
        offline_app(),
        "/api/ai/detect",
        json!({ "text": "too few words" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Text must contain at least 10 words for accurate analysis"
    );

    let (status, body) = post_json(offline_app(), "/api/ai/detect", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Text is required and must be a string");
}

#[tokio::test]
async fn detect_rejects_overlong_text() {
    let text = "word ".repeat(5001);
    let (status, body) = post_json(offline_app(), "/api/ai/detect", json!({ "text": text })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Text is too long. Maximum 5000 words allowed");
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn article_meets_word_count_and_contains_keywords() {
    let (status, body) = post_json(
        offline_app(),
        "/api/generate/article",
        json!({ "topic": "Edge Computing", "keywords": "latency, bandwidth", "wordCount": 200 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    envelope_ok(&body);

    let text = body["data"]["generatedText"].as_str().unwrap();
    assert!(text.split_whitespace().count() >= 200);
    let lower = text.to_lowercase();
    assert!(lower.contains("latency"));
    assert!(lower.contains("bandwidth"));

    // legacy alias mirrors the generated text
    assert_eq!(body["article"], body["data"]["generatedText"]);
}

#[tokio::test]
async fn article_accepts_string_word_count() {
    let (status, body) = post_json(
        offline_app(),
        "/api/generate/article",
        json!({ "topic": "Soil Health", "wordCount": "120" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["targetWordCount"], 120);
}

#[tokio::test]
async fn titles_returns_requested_count() {
    let (status, body) = post_json(
        offline_app(),
        "/api/generate/titles",
        json!({ "topic": "Remote Work", "tone": "witty", "count": 5 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    envelope_ok(&body);
    let titles = body["data"]["titles"].as_array().unwrap();
    assert_eq!(titles.len(), 5);
    assert_eq!(body["titles"], body["data"]["titles"]);
    for title in titles {
        assert!(title.as_str().unwrap().contains("Remote Work"));
    }
}

#[tokio::test]
async fn quotes_of_type_tagline_also_alias_taglines() {
    let (status, body) = post_json(
        offline_app(),
        "/api/generate/quotes",
        json!({ "theme": "resilience", "type": "tagline", "count": 3 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "tagline");
    assert_eq!(body["data"]["quotes"].as_array().unwrap().len(), 3);
    assert_eq!(body["taglines"], body["data"]["quotes"]);
    assert_eq!(body["quotes"], body["data"]["quotes"]);
}

#[tokio::test]
async fn quotes_default_type_omits_taglines() {
    let (status, body) = post_json(
        offline_app(),
        "/api/generate/quotes",
        json!({ "theme": "courage", "count": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "quote");
    assert!(body["data"].get("taglines").is_none());
    assert!(body.get("taglines").is_none());
}

#[tokio::test]
async fn rewrite_is_deterministic_for_identical_input() {
    let payload = json!({ "text": "We can't ship the release yet. The tests are failing.", "mode": "formal" });

    let (status, first) = post_json(offline_app(), "/api/generate/rewrite", payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = post_json(offline_app(), "/api/generate/rewrite", payload).await;

    assert_eq!(first["data"]["rewrittenText"], second["data"]["rewrittenText"]);
    let rewritten = first["data"]["rewrittenText"].as_str().unwrap();
    assert!(rewritten.contains("cannot"));
    assert_eq!(first["rewritten"], first["data"]["rewrittenText"]);
    assert_eq!(first["result"], first["data"]["rewrittenText"]);
}

#[tokio::test]
async fn rewrite_rejects_overlong_text() {
    let text = "word ".repeat(1001);
    let (status, body) = post_json(
        offline_app(),
        "/api/generate/rewrite",
        json!({ "text": text }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Text is too long. Maximum 1000 words allowed");
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ticket_fallback_flags_failures_as_high_priority() {
    let (status, body) = post_json(
        offline_app(),
        "/api/classify/ticket",
        json!({ "text": "The payment export crashed again and we urgently cannot bill customers", "userId": "u-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    envelope_ok(&body);

    let data = &body["data"];
    assert_eq!(data["priority"], "High");
    assert_eq!(data["sentiment"], "Urgent");
    assert_eq!(data["department"], "Customer Success");
    assert_eq!(data["estimatedResponseTime"], "Within 24 hours");
    assert_eq!(data["reasoning"], "Heuristic fallback applied");
    assert_eq!(data["category"], "Payment Processing Failure");
    assert!(!data["keywords"].as_array().unwrap().is_empty());
    assert_eq!(data["metadata"]["userId"], "u-1");
}

#[tokio::test]
async fn ticket_fallback_defaults_to_medium_priority() {
    let (status, body) = post_json(
        offline_app(),
        "/api/classify/ticket",
        json!({ "text": "Could you please add a dark theme to the dashboard settings page" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["priority"], "Medium");
    assert_eq!(body["data"]["sentiment"], "Neutral");
}

#[tokio::test]
async fn ticket_requires_text() {
    let (status, body) = post_json(offline_app(), "/api/classify/ticket", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Ticket text is required");
}

#[tokio::test]
async fn sentiment_returns_label_confidence_and_scores() {
    let (status, body) = post_json(
        offline_app(),
        "/api/classify/sentiment",
        json!({ "text": "I love this product, it changed my life!" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    envelope_ok(&body);

    let data = &body["data"];
    let label = data["label"].as_str().unwrap();
    assert!(["Very Positive", "Positive"].contains(&label));
    assert_eq!(data["sentiment"], data["label"]);

    let confidence = data["confidence"].as_u64().unwrap();
    assert!(confidence <= 100);

    let all_scores = data["allScores"].as_array().unwrap();
    assert_eq!(all_scores.len(), 5);
    for entry in all_scores {
        assert!(entry["score"].as_u64().unwrap() <= 100);
    }

    // legacy alias sits at the top level and never shadows the envelope
    assert_eq!(body["label"], data["label"]);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn sentiment_requires_text() {
    let (status, body) = post_json(
        offline_app(),
        "/api/classify/sentiment",
        json!({ "text": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Text is required");
}
