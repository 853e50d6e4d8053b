//! Gateway to the hosted inference API.
//!
//! Three operations: chat/completion generation, prompted zero-shot
//! classification, and AI-content detection. Every operation degrades to a
//! deterministic heuristic when no API key is configured or the upstream
//! call fails, so callers always receive a usable result. Callers that need
//! to distinguish model output from the local fallback check for
//! [`FALLBACK_PREFIX`].

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::heuristics;
use crate::jsonrepair;
use crate::prompts::ChatMessage;

/// Marker prefixing every locally generated fallback string.
pub const FALLBACK_PREFIX: &str = "This is a deterministic fallback response";

/// Prompt input: a raw string or a role-tagged message list.
#[derive(Debug, Clone)]
pub enum PromptInput {
    Text(String),
    Messages(Vec<ChatMessage>),
}

impl From<String> for PromptInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<ChatMessage>> for PromptInput {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::Messages(messages)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
            top_p: 0.95,
        }
    }
}

/// Ordered label/score pairs from the classify operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
    pub top_label: String,
    pub top_score: f64,
    pub fallback: bool,
}

/// Where a detection result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub ai_probability: f64,
    pub human_probability: f64,
    pub source: DetectionSource,
}

/// Client for the hosted inference API.
#[derive(Clone)]
pub struct ModelGateway {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    chat_model: String,
    detector_model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl ModelGateway {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.model_timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        if settings.model_api_key.is_some() {
            tracing::info!(
                chat_model = %settings.chat_model,
                detector_model = %settings.detector_model,
                "Model gateway initialized"
            );
        } else {
            tracing::warn!("No model API key configured; all responses use deterministic fallbacks");
        }

        Ok(Self {
            client,
            api_key: settings.model_api_key.clone(),
            base_url: settings.model_api_base.trim_end_matches('/').to_string(),
            chat_model: settings.chat_model.clone(),
            detector_model: settings.detector_model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate text from a prompt or message list. Infallible: missing
    /// credentials and upstream failures both produce the marked local
    /// fallback string instead of an error.
    pub async fn generate(&self, input: impl Into<PromptInput>, options: GenerateOptions) -> String {
        let input = input.into();
        if self.api_key.is_none() {
            return fallback_generate(&input);
        }
        match self.try_generate(&input, options).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Text generation failed, using local fallback");
                fallback_generate(&input)
            }
        }
    }

    async fn try_generate(&self, input: &PromptInput, options: GenerateOptions) -> Result<String> {
        let messages = match input {
            PromptInput::Text(text) => vec![ChatMessage::user(text.clone())],
            PromptInput::Messages(messages) => messages.clone(),
        };

        let url = format!(
            "{}/models/{}/v1/chat/completions",
            self.base_url, self.chat_model
        );
        debug!(url = %url, "chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&serde_json::json!({
                "model": self.chat_model,
                "messages": messages,
                "max_tokens": options.max_tokens,
                "temperature": options.temperature,
                "top_p": options.top_p,
            }))
            .send()
            .await
            .context("inference API unreachable")?
            .error_for_status()
            .context("inference API returned an error status")?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("invalid chat completion response")?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Rate each label's relevance to the text, descending by score. Falls
    /// back to token-overlap scoring when the model output is unusable.
    pub async fn classify(&self, text: &str, labels: &[String]) -> Result<Classification> {
        if labels.is_empty() {
            bail!("Labels array required");
        }

        let prompt = crate::prompts::classifier(text, labels);
        let raw = self
            .generate(
                prompt,
                GenerateOptions {
                    max_tokens: 400,
                    temperature: 0.2,
                    top_p: 0.9,
                },
            )
            .await;

        match parse_classification(&raw, labels) {
            Ok(classification) => Ok(classification),
            Err(e) => {
                warn!(error = %e, "Prompted classification failed, using overlap fallback");
                Ok(overlap_classification(text, labels))
            }
        }
    }

    /// Probability that the text is AI-generated, with its complement.
    pub async fn detect_ai(&self, text: &str) -> Detection {
        if self.api_key.is_none() {
            return heuristic_detection(text);
        }
        match self.try_detect(text).await {
            Ok(detection) => detection,
            Err(e) => {
                warn!(error = %e, "AI detection failed, using heuristic");
                heuristic_detection(text)
            }
        }
    }

    async fn try_detect(&self, text: &str) -> Result<Detection> {
        let url = format!("{}/models/{}", self.base_url, self.detector_model);
        debug!(url = %url, "text classification request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await
            .context("inference API unreachable")?
            .error_for_status()
            .context("inference API returned an error status")?;

        let body: Value = response.json().await.context("invalid detection response")?;
        let scores = flatten_label_scores(&body)?;

        // Unusable label sets degrade to the heuristic rather than erroring
        Ok(map_detector_labels(&scores).unwrap_or_else(|| heuristic_detection(text)))
    }
}

fn heuristic_detection(text: &str) -> Detection {
    let (ai, human) = heuristics::detect(text);
    Detection {
        ai_probability: ai,
        human_probability: human,
        source: DetectionSource::Heuristic,
    }
}

/// Flatten `[{label, score}]` or the nested `[[{label, score}]]` shape some
/// detector models return.
fn flatten_label_scores(body: &Value) -> Result<Vec<LabelScore>> {
    let outer = body.as_array().context("detector output is not an array")?;
    let entries: &[Value] = match outer.first() {
        Some(Value::Array(inner)) => inner,
        _ => outer,
    };
    entries
        .iter()
        .map(|v| serde_json::from_value(v.clone()).context("malformed label entry"))
        .collect()
}

/// Map detector labels onto AI/human probabilities.
///
/// Some model revisions label classes 'Fake'/'Real', others 'LABEL_0'/
/// 'LABEL_1'. When only generic labels exist, the higher-confidence one is
/// treated as the human class if it is LABEL_0. That tie-break is a
/// heuristic, not a documented property of any model.
fn map_detector_labels(scores: &[LabelScore]) -> Option<Detection> {
    let find = |needle: &str| {
        scores
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case(needle))
    };

    let (ai, human) = if let Some(real) = find("real") {
        let human = heuristics::normalize_probability(real.score);
        (heuristics::normalize_probability(1.0 - human), human)
    } else if let Some(fake) = find("fake") {
        let ai = heuristics::normalize_probability(fake.score);
        (ai, heuristics::normalize_probability(1.0 - ai))
    } else if let (Some(l0), Some(l1)) = (find("LABEL_0"), find("LABEL_1")) {
        if l0.score >= l1.score {
            let human = heuristics::normalize_probability(l0.score);
            (heuristics::normalize_probability(1.0 - human), human)
        } else {
            let ai = heuristics::normalize_probability(l1.score);
            (ai, heuristics::normalize_probability(1.0 - ai))
        }
    } else {
        return None;
    };

    Some(Detection {
        ai_probability: ai,
        human_probability: human,
        source: DetectionSource::Model,
    })
}

/// Deterministic local generation: a truncated, whitespace-collapsed echo of
/// the prompt behind a fixed marker so callers can detect it.
fn fallback_generate(input: &PromptInput) -> String {
    let base = match input {
        PromptInput::Text(text) => text.clone(),
        PromptInput::Messages(messages) => messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    let collapsed = base.split_whitespace().collect::<Vec<_>>().join(" ");
    let summary: String = collapsed.chars().take(320).collect();
    format!("{FALLBACK_PREFIX} generated locally for testing.\nContext: {summary}")
}

fn parse_classification(raw: &str, labels: &[String]) -> Result<Classification> {
    let candidate = jsonrepair::extract_object(raw).context("No JSON returned by model")?;
    let parsed: Value = serde_json::from_str(candidate).context("Malformed JSON")?;

    let parsed_labels: Vec<String> = parsed
        .get("labels")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .context("missing labels array")?;
    let scores: Vec<f64> = parsed
        .get("scores")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .context("missing scores array")?;

    if parsed_labels.is_empty() || parsed_labels.len() != scores.len() {
        bail!("label/score length mismatch");
    }
    // The model was asked for every input label; tolerate reordering but not
    // invented labels.
    if parsed_labels.iter().any(|l| !labels.contains(l)) {
        bail!("model returned unknown labels");
    }

    let mut pairs: Vec<(String, f64)> = parsed_labels.into_iter().zip(scores).collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(build_classification(pairs, false))
}

fn overlap_classification(text: &str, labels: &[String]) -> Classification {
    build_classification(heuristics::label_overlap(text, labels), true)
}

fn build_classification(pairs: Vec<(String, f64)>, fallback: bool) -> Classification {
    let (top_label, top_score) = pairs
        .first()
        .map(|(l, s)| (l.clone(), *s))
        .unwrap_or_default();
    Classification {
        labels: pairs.iter().map(|(l, _)| l.clone()).collect(),
        scores: pairs.iter().map(|(_, s)| *s).collect(),
        top_label,
        top_score,
        fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn offline_gateway() -> ModelGateway {
        ModelGateway::new(&Settings::offline()).unwrap()
    }

    #[tokio::test]
    async fn unconfigured_generate_is_marked_and_deterministic() {
        let gw = offline_gateway();
        let a = gw
            .generate("Write about   rust".to_string(), GenerateOptions::default())
            .await;
        let b = gw
            .generate("Write about   rust".to_string(), GenerateOptions::default())
            .await;
        assert!(a.starts_with(FALLBACK_PREFIX));
        assert_eq!(a, b);
        assert!(a.contains("Write about rust"));
    }

    #[tokio::test]
    async fn fallback_echo_flattens_messages() {
        let gw = offline_gateway();
        let messages = vec![
            ChatMessage::system("Be terse."),
            ChatMessage::user("Summarize the report."),
        ];
        let out = gw.generate(messages, GenerateOptions::default()).await;
        assert!(out.contains("system: Be terse."));
        assert!(out.contains("user: Summarize the report."));
    }

    #[tokio::test]
    async fn fallback_echo_is_truncated() {
        let gw = offline_gateway();
        let long = "word ".repeat(500);
        let out = gw.generate(long, GenerateOptions::default()).await;
        let context = out.split("Context: ").nth(1).unwrap();
        assert!(context.chars().count() <= 320);
    }

    #[tokio::test]
    async fn unconfigured_classify_uses_overlap_fallback() {
        let gw = offline_gateway();
        let labels = vec![
            "Authentication Problem".to_string(),
            "Feature Request".to_string(),
        ];
        let result = gw
            .classify("Users report an authentication problem at login", &labels)
            .await
            .unwrap();
        assert!(result.fallback);
        assert_eq!(result.top_label, "Authentication Problem");
        assert_eq!(result.labels.len(), result.scores.len());
    }

    #[tokio::test]
    async fn classify_requires_labels() {
        let gw = offline_gateway();
        assert!(gw.classify("text", &[]).await.is_err());
    }

    #[tokio::test]
    async fn unconfigured_detection_is_heuristic_and_complements() {
        let gw = offline_gateway();
        let d = gw
            .detect_ai("Short distinct sentences vary. People write unevenly. Ideas wander off.")
            .await;
        assert_eq!(d.source, DetectionSource::Heuristic);
        assert!((d.ai_probability + d.human_probability - 1.0).abs() < 1e-3);
    }

    #[test]
    fn parse_classification_sorts_descending() {
        let labels = vec!["A".to_string(), "B".to_string()];
        let raw = r#"{"labels":["A","B"],"scores":[0.2,0.9]}"#;
        let c = parse_classification(raw, &labels).unwrap();
        assert_eq!(c.top_label, "B");
        assert_eq!(c.scores, vec![0.9, 0.2]);
    }

    #[test]
    fn parse_classification_rejects_length_mismatch() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert!(parse_classification(r#"{"labels":["A"],"scores":[0.2,0.9]}"#, &labels).is_err());
        assert!(parse_classification("no json here", &labels).is_err());
    }

    #[test]
    fn detector_real_label_maps_to_human() {
        let scores = vec![LabelScore {
            label: "Real".to_string(),
            score: 0.8,
        }];
        let d = map_detector_labels(&scores).unwrap();
        assert_eq!(d.human_probability, 0.8);
        assert_eq!(d.ai_probability, 0.2);
    }

    #[test]
    fn detector_generic_labels_use_tie_break() {
        let scores = vec![
            LabelScore {
                label: "LABEL_0".to_string(),
                score: 0.7,
            },
            LabelScore {
                label: "LABEL_1".to_string(),
                score: 0.3,
            },
        ];
        let d = map_detector_labels(&scores).unwrap();
        // LABEL_0 winning is treated as the human class
        assert_eq!(d.human_probability, 0.7);

        let scores = vec![
            LabelScore {
                label: "LABEL_0".to_string(),
                score: 0.1,
            },
            LabelScore {
                label: "LABEL_1".to_string(),
                score: 0.9,
            },
        ];
        let d = map_detector_labels(&scores).unwrap();
        assert_eq!(d.ai_probability, 0.9);
    }

    #[test]
    fn detector_unknown_labels_are_rejected() {
        let scores = vec![LabelScore {
            label: "POSITIVE".to_string(),
            score: 0.9,
        }];
        assert!(map_detector_labels(&scores).is_none());
    }

    #[test]
    fn nested_detector_arrays_flatten() {
        let body = serde_json::json!([[{"label": "Fake", "score": 0.6}]]);
        let scores = flatten_label_scores(&body).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].label, "Fake");
    }
}
