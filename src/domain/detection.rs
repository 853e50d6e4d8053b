//! AI-content detection shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub ai_probability: f64,
    pub human_probability: f64,
    pub verdict: String,
    pub confidence: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentBrief {
    pub label: String,
    pub score: u32,
}

/// Readability-style metrics derived from simple length ratios, not from
/// the model.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    pub sentence_complexity: u32,
    pub vocabulary_diversity: u32,
    pub natural_flow: u32,
    pub contextual_coherence: u32,
    pub sentiment: SentimentBrief,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionMetadata {
    pub text_length: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    pub ai_probability_percent: u32,
    pub analyzed_at: String,
}

#[derive(Debug, Serialize)]
pub struct DetectionReport {
    pub detection: DetectionSummary,
    pub analysis: AnalysisMetrics,
    pub indicators: Vec<String>,
    pub metadata: DetectionMetadata,
}
