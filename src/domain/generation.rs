//! Text generation shapes: articles, titles, quotes, rewriting.

use serde::{Deserialize, Serialize};

use super::NumberOrString;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    pub topic: Option<String>,
    pub keywords: Option<String>,
    pub word_count: Option<NumberOrString>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleData {
    pub topic: String,
    pub keywords: Vec<String>,
    pub target_word_count: usize,
    pub generated_text: String,
    pub actual_word_count: usize,
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct TitlesRequest {
    pub topic: Option<String>,
    pub tone: Option<String>,
    pub count: Option<NumberOrString>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlesData {
    pub topic: String,
    pub tone: String,
    pub count: usize,
    pub titles: Vec<String>,
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct QuotesRequest {
    pub theme: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: Option<NumberOrString>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesData {
    pub theme: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    pub quotes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taglines: Option<Vec<String>>,
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub text: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteData {
    pub mode: String,
    pub original_text: String,
    pub rewritten_text: String,
    pub original_word_count: usize,
    pub rewritten_word_count: usize,
    pub generated_at: String,
}
