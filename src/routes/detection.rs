//! AI-content detection endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use crate::api::Envelope;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::detection::{
    AnalysisMetrics, DetectRequest, DetectionMetadata, DetectionReport, DetectionSummary,
    SentimentBrief,
};
use crate::error::{ApiError, ApiResult};
use crate::heuristics;

const MIN_WORDS: usize = 10;
const MAX_WORDS: usize = 5000;

fn verdict_for(ai_percent: f64) -> (&'static str, &'static str, &'static [&'static str]) {
    if ai_percent >= 70.0 {
        (
            "Likely AI-Generated",
            "High",
            &[
                "High confidence of AI-generated patterns",
                "Consistent structural patterns detected",
                "Limited contextual variation",
                "Formulaic language style",
            ],
        )
    } else if ai_percent >= 40.0 {
        (
            "Possibly Mixed Content",
            "Medium",
            &[
                "Mixed indicators of AI and human writing",
                "Some AI-like patterns present",
                "Moderate structural consistency",
                "Varying language complexity",
            ],
        )
    } else {
        (
            "Likely Human-Written",
            "High",
            &[
                "Natural language variation detected",
                "Diverse sentence structures",
                "Authentic contextual flow",
                "Human-like stylistic elements",
            ],
        )
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// POST /api/ai/detect
pub async fn detect_content(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DetectRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = req
        .text
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Text is required and must be a string".to_string()))?;

    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text cannot be empty".to_string()));
    }

    let word_count = heuristics::word_count(text);
    if word_count < MIN_WORDS {
        return Err(ApiError::BadRequest(
            "Text must contain at least 10 words for accurate analysis".to_string(),
        ));
    }
    if word_count > MAX_WORDS {
        return Err(ApiError::BadRequest(
            "Text is too long. Maximum 5000 words allowed".to_string(),
        ));
    }

    let detection = state.gateway.detect_ai(text).await;

    let sentence_count = heuristics::sentence_count(text);
    let avg_sentence_length = word_count as f64 / sentence_count as f64;
    let avg_word_length = heuristics::avg_word_length(text);
    let ai_percent = detection.ai_probability * 100.0;

    let (verdict, confidence, indicators) = verdict_for(ai_percent);

    let report = DetectionReport {
        detection: DetectionSummary {
            ai_probability: detection.ai_probability,
            human_probability: detection.human_probability,
            verdict: verdict.to_string(),
            confidence: confidence.to_string(),
        },
        analysis: AnalysisMetrics {
            sentence_complexity: ((avg_sentence_length * 3.0).round() as u32).min(100),
            vocabulary_diversity: (((avg_word_length - 3.0) * 20.0).round().max(0.0) as u32)
                .min(100),
            natural_flow: (100.0 - ai_percent * 0.8).round().max(0.0) as u32,
            contextual_coherence: 75,
            sentiment: SentimentBrief {
                label: "neutral".to_string(),
                score: 50,
            },
        },
        indicators: indicators.iter().map(|s| s.to_string()).collect(),
        metadata: DetectionMetadata {
            text_length: text.len(),
            word_count,
            sentence_count,
            avg_sentence_length: round1(avg_sentence_length),
            avg_word_length: round1(avg_word_length),
            ai_probability_percent: (ai_percent.round().clamp(0.0, 100.0)) as u32,
            analyzed_at: Utc::now().to_rfc3339(),
        },
    };

    Ok(Envelope::ok(
        "AI content detection completed successfully",
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_thresholds_match_documented_tiers() {
        assert_eq!(verdict_for(85.0).0, "Likely AI-Generated");
        assert_eq!(verdict_for(70.0).0, "Likely AI-Generated");
        assert_eq!(verdict_for(55.0).0, "Possibly Mixed Content");
        assert_eq!(verdict_for(40.0).0, "Possibly Mixed Content");
        assert_eq!(verdict_for(39.9).0, "Likely Human-Written");
        assert_eq!(verdict_for(0.0).0, "Likely Human-Written");
    }

    #[test]
    fn verdict_carries_four_indicators() {
        for percent in [90.0, 50.0, 10.0] {
            assert_eq!(verdict_for(percent).2.len(), 4);
        }
    }
}
