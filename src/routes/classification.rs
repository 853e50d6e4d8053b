//! Classification endpoints: support tickets, resumes, sentiment.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::api::Envelope;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::classification::{
    LabelConfidence, ResumeAnalysis, ResumeMetadata, SentimentData, SentimentRequest,
    TicketClassification, TicketMetadata, TicketRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::extract::{self, UploadedFile};
use crate::heuristics;
use crate::jsonrepair;
use crate::prompts;
use crate::services::model_gateway::GenerateOptions;

const SENTIMENT_LABELS: [&str; 5] = [
    "Very Positive",
    "Positive",
    "Neutral",
    "Negative",
    "Very Negative",
];

const TICKET_FALLBACK_CATEGORIES: [&str; 8] = [
    "Payment Processing Failure",
    "Feature Request",
    "Authentication Problem",
    "Data Loss",
    "Performance Degradation",
    "Bug Report",
    "Account Access",
    "Configuration Help",
];

const FAILURE_MARKERS: [&str; 7] = [
    "crash", "data loss", "failed", "down", "error", "unable", "cannot",
];
const URGENCY_MARKERS: [&str; 4] = ["urgent", "asap", "immediately", "now"];

const RESUME_RETRY_DELAY: Duration = Duration::from_millis(300);
const MAX_ARRAY_ITEMS: usize = 6;
// Entries must stay strictly under 150 characters.
const MAX_ITEM_CHARS: usize = 149;

// =============================================================================
// Ticket classification
// =============================================================================

fn string_field(parsed: &Value, key: &str) -> Option<String> {
    parsed
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_array(parsed: &Value, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = parsed
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Try to read a full triage result out of the model's JSON.
fn parse_ticket_json(raw: &str) -> Option<(String, String, String, String, String, Vec<String>, String)> {
    let candidate = jsonrepair::extract_object(raw)?;
    let parsed: Value = serde_json::from_str(candidate).ok()?;
    Some((
        string_field(&parsed, "category")?,
        string_field(&parsed, "priority")?,
        string_field(&parsed, "department")?,
        string_field(&parsed, "sentiment")?,
        string_field(&parsed, "estimatedResponseTime")?,
        string_array(&parsed, "keywords").unwrap_or_default(),
        string_field(&parsed, "reasoning").unwrap_or_default(),
    ))
}

/// POST /api/classify/ticket
pub async fn classify_ticket(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<TicketRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = req
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Ticket text is required".to_string()))?
        .to_string();

    let prompt = prompts::ticket_triage(&text);
    let raw = state
        .gateway
        .generate(
            prompt,
            GenerateOptions {
                max_tokens: 500,
                temperature: 0.2,
                top_p: 0.9,
            },
        )
        .await;

    let (category, priority, department, sentiment, estimated_response_time, keywords, reasoning) =
        match parse_ticket_json(&raw) {
            Some(parsed) => parsed,
            None => {
                warn!("Ticket triage output unusable, fallback classification engaged");
                let labels: Vec<String> = TICKET_FALLBACK_CATEGORIES
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                let cat = state.gateway.classify(&text, &labels).await?;
                let priority = if heuristics::contains_any(&text, &FAILURE_MARKERS) {
                    "High"
                } else {
                    "Medium"
                };
                let sentiment = if heuristics::contains_any(&text, &URGENCY_MARKERS) {
                    "Urgent"
                } else {
                    "Neutral"
                };
                (
                    cat.top_label,
                    priority.to_string(),
                    "Customer Success".to_string(),
                    sentiment.to_string(),
                    "Within 24 hours".to_string(),
                    heuristics::keyword_candidates(&text, 5),
                    "Heuristic fallback applied".to_string(),
                )
            }
        };

    let classification = TicketClassification {
        category,
        priority,
        department,
        sentiment,
        estimated_response_time,
        keywords,
        reasoning,
        metadata: TicketMetadata {
            user_id: req.user_id,
            text_length: text.len(),
            word_count: heuristics::word_count(&text),
            classified_at: Utc::now().to_rfc3339(),
            model: state.settings.chat_model.clone(),
        },
    };

    Ok(Envelope::ok(
        "Ticket classified successfully",
        classification,
    ))
}

// =============================================================================
// Resume analysis
// =============================================================================

fn clip_entry(entry: &str) -> String {
    let clipped: String = entry.chars().take(MAX_ITEM_CHARS).collect();
    clipped.trim_end().to_string()
}

/// Trim, clip entry length, drop empties, dedupe in order, cap count. The
/// clip happens before the dedupe so entries sharing a long prefix cannot
/// collide into duplicates afterwards. The fallback list is used when the
/// model supplied nothing usable.
fn sanitize_array(value: Option<&Value>, fallback: &[&str]) -> Vec<String> {
    let cleaned: Vec<String> = value
        .and_then(Value::as_array)
        .map(|items| {
            let mut seen = Vec::new();
            for item in items {
                let entry = match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                let entry = clip_entry(&entry);
                if entry.is_empty() || seen.contains(&entry) {
                    continue;
                }
                seen.push(entry);
            }
            seen
        })
        .unwrap_or_default();

    let source: Vec<String> = if cleaned.is_empty() {
        fallback.iter().map(|s| clip_entry(s)).collect()
    } else {
        cleaned
    };

    source.into_iter().take(MAX_ARRAY_ITEMS).collect()
}

fn clamp_score(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_f64)
        .map(|n| n.round().clamp(0.0, 100.0) as u32)
        .unwrap_or(0)
}

const DEFAULT_STRENGTHS: [&str; 4] = [
    "Led cross-functional delivery initiatives",
    "Improved operational efficiency with process refinement",
    "Implemented scalable solutions aligning with strategic goals",
    "Collaborated across teams to accelerate outcomes",
];
const DEFAULT_WEAKNESSES: [&str; 4] = [
    "Limited quantifiable impact metrics",
    "Scope of leadership unclear in several projects",
    "Missing clarity on budget or cost ownership",
    "Few references to stakeholder alignment",
];
const DEFAULT_SKILL_GAPS: [&str; 4] = [
    "Advanced data-driven decision making",
    "End-to-end performance benchmarking",
    "Formal risk management framework",
    "Cost optimization strategies",
];
const DEFAULT_ATS_KEYWORDS: [&str; 5] = [
    "leadership",
    "automation",
    "scalability",
    "optimization",
    "integration",
];

struct ParsedAnalysis {
    overall_score: u32,
    experience_alignment: String,
    key_strengths: Vec<String>,
    critical_weaknesses: Vec<String>,
    skill_gaps: Vec<String>,
    ats_keywords: Vec<String>,
    top_priority_action: String,
    next_step_advice: String,
}

fn shape_analysis(parsed: &Value, resume_text: &str) -> ParsedAnalysis {
    let inferred: Vec<String> = heuristics::top_tokens(resume_text, 8);
    let ats_fallback: Vec<&str> = if inferred.is_empty() {
        DEFAULT_ATS_KEYWORDS.to_vec()
    } else {
        inferred.iter().map(String::as_str).collect()
    };

    ParsedAnalysis {
        overall_score: clamp_score(parsed.get("overallScore")),
        experience_alignment: string_field(parsed, "experienceAlignment").unwrap_or_else(|| {
            "Candidate shows partial alignment; more quantified impact metrics and clearer \
             leadership scope would strengthen fit."
                .to_string()
        }),
        key_strengths: sanitize_array(parsed.get("keyStrengths"), &DEFAULT_STRENGTHS),
        critical_weaknesses: sanitize_array(parsed.get("criticalWeaknesses"), &DEFAULT_WEAKNESSES),
        skill_gaps: sanitize_array(parsed.get("skillGaps"), &DEFAULT_SKILL_GAPS),
        ats_keywords: sanitize_array(parsed.get("atsKeywords"), &ats_fallback),
        top_priority_action: string_field(parsed, "topPriorityAction").unwrap_or_else(|| {
            "Add quantified outcome metrics (e.g., % performance gains, revenue impact) to major \
             accomplishments."
                .to_string()
        }),
        next_step_advice: string_field(parsed, "nextStepAdvice").unwrap_or_else(|| {
            "Refine achievement bullets to start with action verbs and include measurable \
             outcomes; emphasize leadership scope and cross-functional impact."
                .to_string()
        }),
    }
}

fn degraded_analysis(error: &str) -> ParsedAnalysis {
    ParsedAnalysis {
        overall_score: 0,
        experience_alignment: "Analysis temporarily unavailable.".to_string(),
        key_strengths: vec!["Unable to analyze".to_string()],
        critical_weaknesses: vec!["AI service temporarily unavailable".to_string()],
        skill_gaps: vec!["Try again later".to_string()],
        ats_keywords: vec!["Try again later".to_string()],
        top_priority_action: "Please try again later".to_string(),
        next_step_advice: format!("Retry once the AI service is available. ({error})"),
    }
}

/// Pad extracted text with filler until it reaches the configured minimum,
/// erroring if there is nothing to work with at all.
fn expand_resume_text(content: &str, job_title: &str, min_chars: usize) -> Result<String, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(
            "Extracted text is too short. File might be scanned image or empty.".to_string(),
        ));
    }
    if trimmed.len() >= min_chars {
        return Ok(trimmed.to_string());
    }
    let filler = format!(
        " {} demonstrates adaptable leadership, measurable delivery, and collaborative execution skills.",
        if job_title.is_empty() { "Candidate" } else { job_title }
    );
    let mut buffer = trimmed.to_string();
    while buffer.len() < min_chars {
        buffer.push_str(&filler);
    }
    Ok(buffer)
}

/// POST /api/classify/resume (multipart: file + jobTitle)
pub async fn analyze_resume(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (file, fields) = extract::read_multipart(multipart).await?;
    let file: UploadedFile =
        file.ok_or_else(|| ApiError::BadRequest("Resume file is required".to_string()))?;

    let job_title = fields
        .get("jobTitle")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Job title is required".to_string()))?;

    extract::validate(&file, state.settings.max_upload_mb).map_err(ApiError::BadRequest)?;

    let file_url = super::store_upload(&state, &file, "resumes")
        .await?
        .map(|stored| stored.secure_url);

    let text = extract::extract_text(&file.bytes, &file.mime)
        .map_err(|e| ApiError::BadRequest(format!("Failed to parse resume file: {e}")))?;
    let text = expand_resume_text(&text, &job_title, state.settings.resume_min_chars)?;

    // One best-effort retry with a fixed delay, then a degraded response
    let mut analysis: Option<ParsedAnalysis> = None;
    let mut last_error = String::new();
    for attempt in 0..2 {
        let messages = prompts::resume_review(&text, &job_title);
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

        match jsonrepair::repair(&raw) {
            Ok(parsed) => {
                analysis = Some(shape_analysis(&parsed, &text));
                break;
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt == 0 {
                    tokio::time::sleep(RESUME_RETRY_DELAY).await;
                }
            }
        }
    }

    let (shaped, error) = match analysis {
        Some(shaped) => (shaped, None),
        None => {
            warn!(error = %last_error, "Resume analysis failed on both attempts");
            (degraded_analysis(&last_error), Some(last_error))
        }
    };

    let result = ResumeAnalysis {
        overall_score: shaped.overall_score,
        experience_alignment: shaped.experience_alignment,
        key_strengths: shaped.key_strengths,
        critical_weaknesses: shaped.critical_weaknesses,
        skill_gaps: shaped.skill_gaps,
        ats_keywords: shaped.ats_keywords,
        top_priority_action: shaped.top_priority_action,
        next_step_advice: shaped.next_step_advice,
        error,
        metadata: ResumeMetadata {
            job_title,
            file_url,
            file_name: file.name,
            analyzed_at: Utc::now().to_rfc3339(),
        },
    };

    Ok(Envelope::ok("Resume analyzed successfully", result))
}

// =============================================================================
// Sentiment analysis
// =============================================================================

/// POST /api/classify/sentiment
pub async fn analyze_sentiment(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SentimentRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = req
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Text is required".to_string()))?;

    let labels: Vec<String> = SENTIMENT_LABELS.iter().map(|s| s.to_string()).collect();
    let result = state.gateway.classify(text, &labels).await?;

    let all_scores = result
        .labels
        .iter()
        .zip(&result.scores)
        .map(|(label, score)| LabelConfidence {
            label: label.clone(),
            score: (score * 100.0).round().clamp(0.0, 100.0) as u32,
        })
        .collect();

    let data = SentimentData {
        label: result.top_label.clone(),
        sentiment: result.top_label.clone(),
        confidence: (result.top_score * 100.0).round().clamp(0.0, 100.0) as u32,
        all_scores,
        analyzed_at: Utc::now().to_rfc3339(),
    };

    let label = data.label.clone();
    Ok(Envelope::ok("Sentiment analyzed successfully", data)
        .with_aliases(&[("label", json!(label))]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_array_dedupes_and_caps() {
        let value = json!(["  Led teams ", "Led teams", "", "Shipped features", 42]);
        let out = sanitize_array(Some(&value), &["fallback"]);
        assert_eq!(out[0], "Led teams");
        assert_eq!(out[1], "Shipped features");
        assert_eq!(out[2], "42");
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn sanitize_array_keeps_entries_under_150_chars() {
        let long = "x".repeat(400);
        let value = json!([long]);
        let out = sanitize_array(Some(&value), &["fallback"]);
        assert!(out[0].chars().count() < 150);
        assert_eq!(out[0].chars().count(), MAX_ITEM_CHARS);
    }

    #[test]
    fn entries_sharing_a_long_prefix_dedupe_after_clipping() {
        let prefix = "y".repeat(200);
        let value = json!([format!("{prefix} alpha"), format!("{prefix} beta")]);
        let out = sanitize_array(Some(&value), &["fallback"]);
        assert_eq!(out.len(), 1);
        assert!(out[0].chars().count() < 150);
    }

    #[test]
    fn sanitize_array_substitutes_fallback() {
        let out = sanitize_array(Some(&json!([])), &["a", "b"]);
        assert_eq!(out, vec!["a", "b"]);
        let out = sanitize_array(None, &["a"]);
        assert_eq!(out, vec!["a"]);
    }

    #[test]
    fn clamp_score_bounds_and_rounds() {
        assert_eq!(clamp_score(Some(&json!(82.6))), 83);
        assert_eq!(clamp_score(Some(&json!(-5))), 0);
        assert_eq!(clamp_score(Some(&json!(250))), 100);
        assert_eq!(clamp_score(Some(&json!("oops"))), 0);
        assert_eq!(clamp_score(None), 0);
    }

    #[test]
    fn resume_text_is_expanded_to_minimum() {
        let out = expand_resume_text("Short resume.", "CTO", 120).unwrap();
        assert!(out.len() >= 120);
        assert!(out.contains("CTO demonstrates"));
    }

    #[test]
    fn empty_resume_text_is_rejected() {
        assert!(expand_resume_text("   ", "CTO", 50).is_err());
    }

    #[test]
    fn ticket_json_parses_complete_payload() {
        let raw = r#"{"category":"Authentication Problem","priority":"High","department":"Engineering","sentiment":"Negative","estimatedResponseTime":"Within 4 hours","keywords":["login","sso"],"reasoning":"Users cannot log in."}"#;
        let parsed = parse_ticket_json(raw).unwrap();
        assert_eq!(parsed.0, "Authentication Problem");
        assert_eq!(parsed.5, vec!["login", "sso"]);
    }

    #[test]
    fn ticket_json_rejects_incomplete_payload() {
        assert!(parse_ticket_json(r#"{"category":"X"}"#).is_none());
        assert!(parse_ticket_json("not json at all").is_none());
    }

    #[test]
    fn failure_markers_drive_priority() {
        assert!(heuristics::contains_any(
            "The export crashed and we cannot recover",
            &FAILURE_MARKERS
        ));
        assert!(!heuristics::contains_any(
            "Please add a dark theme option",
            &URGENCY_MARKERS
        ));
    }
}
