//! Prompt templates for every endpoint.
//!
//! Classification-style prompts embed the exact output JSON schema and the
//! allowed value sets inline, and demand minified JSON with no commentary.
//! The handlers depend on that contract: any deviation is routed through
//! JSON repair and, failing that, the heuristic fallback.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Truncate on a character boundary without allocating past `max` chars.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn article(topic: &str, keywords: &[String], target_words: usize) -> String {
    let keywords_text = if keywords.is_empty() {
        String::new()
    } else {
        format!("Keywords: {}\n", keywords.join(", "))
    };
    format!(
        "Write a comprehensive article about \"{topic}\".\n{keywords_text}\nTarget length: approximately {target_words} words.\n\nArticle:"
    )
}

pub fn titles(topic: &str, tone: &str, count: usize) -> String {
    format!(
        "Generate {count} catchy, SEO-friendly blog titles about \"{topic}\" in a {tone} tone.\nFormat: One title per line, numbered.\n\nTitles:"
    )
}

pub fn quotes(theme: &str, content_type: &str, count: usize) -> String {
    let mut heading = content_type.to_string();
    if let Some(first) = heading.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!(
        "Generate {count} {content_type} about \"{theme}\".\nFormat: One per line.\n\n{heading}:"
    )
}

pub fn rewrite(text: &str, mode: &str) -> String {
    let instruction = match mode {
        "formal" => "Rewrite the following text in a formal, professional tone",
        "casual" => "Rewrite the following text in a casual, conversational tone",
        "creative" => "Rewrite the following text with creative flair and engaging language",
        "concise" => "Rewrite the following text to be more concise and direct",
        _ => "Rewrite the following text while maintaining its meaning",
    };
    format!("{instruction}:\n\nOriginal text: \"{text}\"\n\nRewritten text:")
}

/// Relevance-scoring prompt used by the gateway's classify operation.
pub fn classifier(text: &str, labels: &[String]) -> String {
    format!(
        "You are a classifier. Rate relevance (0-1) for each label to the text. Return JSON {{\"labels\":[...],\"scores\":[...]}}. Sort descending by score.\nText: \"\"\"{}\"\"\"\nLabels: {}",
        truncate_chars(text, 3000),
        labels.join(", ")
    )
}

pub fn ticket_triage(text: &str) -> String {
    format!(
        r#"You are a senior SaaS support ticket triage engine.
Analyze the ticket and OUTPUT ONLY MINIFIED JSON.

TICKET:
"""
{}
"""

INSTRUCTIONS:
- Derive a SPECIFIC category (avoid vague words like 'Issue', 'Problem').
- Infer priority using impact & urgency: Critical only for outage, security breach, irreversible data loss.
- Department MUST be one of: Engineering, Product, Customer Success, Finance, Security, DevOps, Data, Design, Sales.
- Sentiment MUST be one of: Urgent | Negative | Neutral | Positive (choose Urgent ONLY if explicit urgency exists).
- estimatedResponseTime MUST be one of: Within 1 hour | Within 4 hours | Within 24 hours | Within 48 hours | Within 1 week.
- keywords: Provide 3-7 domain-specific tokens (no duplicates, all lowercase, no generic words like 'issue', 'need').
- reasoning: ONE concise sentence citing the trigger phrase or condition from the ticket.

QUALITY RULES:
- If authentication/login mentioned, the category should reflect auth/access.
- If payment, invoice, refund mentioned, the category should reflect billing/finance.
- If slowness / latency / performance, performance related.
- If feature request language ("would like", "can you add"), Feature Request.
- If crash, error stack, exception, Bug Report or Data Loss depending on context.
- Prefer specificity over brevity.

OUTPUT SCHEMA (MINIFIED JSON ONLY): {{"category":"...","priority":"Critical|High|Medium|Low","department":"...","sentiment":"...","estimatedResponseTime":"...","keywords":["..."],"reasoning":"..."}}"#,
        truncate_chars(text, 4000)
    )
}

pub fn resume_review(resume_text: &str, job_title: &str) -> Vec<ChatMessage> {
    let system = "You are a Principal Talent Acquisition Lead reviewing resumes for executive-level roles. \
        You care about clarity, quantifiable impact, leadership, ATS readiness, and business outcomes. \
        Always mention gaps, weak metrics, or missing context. \
        Respond only with JSON that matches the provided schema. No commentary, markdown, or explanations. \
        If information is missing, infer reasonable placeholders rather than leaving blanks.";

    let user = format!(
        r#"Analyze the candidate resume for the role "{job_title}".
Consider leadership progression, domain expertise, measurable achievements, and cultural fit.

Resume excerpt (first 3500 characters):
"""
{excerpt}
"""

Schema:
{{
  "overallScore": <0-100>,
  "experienceAlignment": "<one paragraph summary>",
  "keyStrengths": ["string", ...],
  "criticalWeaknesses": ["string", ...],
  "skillGaps": ["string", ...],
  "atsKeywords": ["string", ...],
  "topPriorityAction": "<single most important change>",
  "nextStepAdvice": "<specific guidance>"
}}

Rules:
- overallScore: numeric quality assessment (0 weak, 100 outstanding). Avoid 0 unless truly empty.
- experienceAlignment: MUST be 5-7 sentences summarizing relevance, scope, impact, leadership, and gaps.
- keyStrengths: 6-8 action-oriented items; each starts with a verb (e.g., "Led", "Optimized").
- criticalWeaknesses: 3-5 items highlighting missing metrics, unclear scope, weak leadership signals.
- skillGaps: 3-5 domain or role-specific capabilities NOT evidenced (e.g., "Cloud cost optimization").
- atsKeywords: 8-10 keywords (lowercase, no duplicates) strongly tied to the role. Include skills, technologies, methodologies found OR logically expected.
- topPriorityAction: One concrete improvement (include metric angle if possible).
- nextStepAdvice: 2-3 sentences giving tactical improvement guidance.
- NEVER return empty arrays; if absent, infer reasonable placeholders based on role and text.
- Cite sections or phrases when possible using quotes ("project", "migration").
- Output must be VALID MINIFIED JSON. No comments, no markdown.
- Ensure each array item < 150 characters.
- If the resume is very short, still synthesize plausible professional improvements relevant to the role."#,
        job_title = job_title,
        excerpt = truncate_chars(resume_text, 3500)
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn document_assistant(document_text: &str, question: &str) -> Vec<ChatMessage> {
    let system = "You are a meticulous document analysis assistant. Answer only using the uploaded file. \
        If the answer is missing, explicitly say you cannot find it. Cite sections or quotes when possible.";

    let user = format!(
        "Document excerpt (first 3000 characters):\n\"\"\"\n{}\n\"\"\"\n\nQuestion:\n{}",
        truncate_chars(document_text, 3000),
        question
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_prompt_mentions_topic_and_keywords() {
        let p = article("Rust", &["ownership".to_string()], 300);
        assert!(p.contains("\"Rust\""));
        assert!(p.contains("Keywords: ownership"));
        assert!(p.contains("300 words"));
    }

    #[test]
    fn classifier_prompt_truncates_long_text() {
        let text = "x".repeat(5000);
        let p = classifier(&text, &["A".to_string()]);
        assert!(p.len() < 3400);
    }

    #[test]
    fn resume_messages_have_system_then_user() {
        let msgs = resume_review("Led a team of engineers.", "CTO");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert!(msgs[1].content.contains("\"CTO\""));
        assert!(msgs[1].content.contains("MINIFIED JSON"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
