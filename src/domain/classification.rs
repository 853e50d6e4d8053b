//! Ticket, resume and sentiment classification shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub text: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMetadata {
    pub user_id: Option<String>,
    pub text_length: usize,
    pub word_count: usize,
    pub classified_at: String,
    pub model: String,
}

/// Structured triage outcome, either parsed from model JSON or synthesized
/// by heuristics. Field values come from the enumerated sets in the prompt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketClassification {
    pub category: String,
    pub priority: String,
    pub department: String,
    pub sentiment: String,
    pub estimated_response_time: String,
    pub keywords: Vec<String>,
    pub reasoning: String,
    pub metadata: TicketMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMetadata {
    pub job_title: String,
    pub file_url: Option<String>,
    pub file_name: String,
    pub analyzed_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub overall_score: u32,
    pub experience_alignment: String,
    pub key_strengths: Vec<String>,
    pub critical_weaknesses: Vec<String>,
    pub skill_gaps: Vec<String>,
    pub ats_keywords: Vec<String>,
    pub top_priority_action: String,
    pub next_step_advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: ResumeMetadata,
}

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelConfidence {
    pub label: String,
    pub score: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentData {
    pub label: String,
    pub sentiment: String,
    pub confidence: u32,
    pub all_scores: Vec<LabelConfidence>,
    pub analyzed_at: String,
}
