//! Deterministic text heuristics.
//!
//! Everything here is a pure function over the input text. These are the
//! fallback paths the gateway and handlers use when the hosted model is
//! unconfigured or returns unusable output, so they must stay deterministic.

use std::collections::{HashMap, HashSet};

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of sentences, splitting on `.`, `!` and `?`. Blank fragments are
/// ignored; a text with no terminator counts as one sentence.
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1)
}

/// Average word length: non-whitespace characters divided by word count.
pub fn avg_word_length(text: &str) -> f64 {
    let words = word_count(text);
    if words == 0 {
        return 0.0;
    }
    let chars = text.chars().filter(|c| !c.is_whitespace()).count();
    chars as f64 / words as f64
}

/// Ratio of unique (case-folded) words to total words.
pub fn unique_word_ratio(text: &str) -> f64 {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&String> = words.iter().collect();
    unique.len() as f64 / words.len() as f64
}

/// Clamp to [0,1] and round to 4 decimal places.
pub fn normalize_probability(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}

/// Heuristic AI/human probabilities derived from lexical diversity and
/// average sentence length. Long, repetitive sentences push the score up.
pub fn detect(text: &str) -> (f64, f64) {
    let words = word_count(text);
    let sentences = sentence_count(text);
    let avg_sentence_len = words as f64 / sentences as f64;
    let seed = 0.35 + avg_sentence_len * 0.01 - unique_word_ratio(text) * 0.2;
    let ai = normalize_probability(seed);
    let human = normalize_probability(1.0 - ai);
    (ai, human)
}

/// Score each label by the fraction of its tokens found as substrings of the
/// text, stable-sorted descending so ties keep the caller's label order.
pub fn label_overlap(text: &str, labels: &[String]) -> Vec<(String, f64)> {
    let lower = text.to_lowercase();
    let mut pairs: Vec<(String, f64)> = labels
        .iter()
        .map(|label| {
            let tokens: Vec<&str> = label.split_whitespace().collect();
            let hits = tokens
                .iter()
                .filter(|t| lower.contains(&t.to_lowercase()))
                .count();
            let score = if tokens.is_empty() {
                0.0
            } else {
                hits as f64 / tokens.len() as f64
            };
            (label.clone(), score)
        })
        .collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    pairs
}

const STOPWORDS: &[&str] = &[
    "and", "for", "the", "with", "from", "that", "this", "into", "over", "under", "work", "team",
    "role", "lead", "skill", "skills",
];

/// Frequency-ranked lowercase tokens longer than three characters, with
/// common filler words removed. Used as an ATS-keyword fallback.
pub fn top_tokens(text: &str, max: usize) -> Vec<String> {
    let stop: HashSet<&str> = STOPWORDS.iter().copied().collect();
    let mut freq: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for raw in text.to_lowercase().split(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '+' && c != '.') {
        let token = raw.trim_matches('.');
        if token.len() <= 3 || stop.contains(token) {
            continue;
        }
        if !freq.contains_key(token) {
            order.push(token.to_string());
        }
        *freq.entry(token.to_string()).or_insert(0) += 1;
    }

    // Stable by first appearance among equal counts
    order.sort_by(|a, b| freq[b].cmp(&freq[a]));
    order.truncate(max);
    order
}

/// First `max` tokens longer than four characters, lowercased. Matches the
/// ticket-classification keyword fallback.
pub fn keyword_candidates(text: &str, max: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() > 4)
        .take(max)
        .map(|w| w.to_string())
        .collect()
}

/// True if the text mentions any of the given markers, case-insensitively.
pub fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_and_sentences() {
        let text = "One two three. Four five! Six?";
        assert_eq!(word_count(text), 6);
        assert_eq!(sentence_count(text), 3);
    }

    #[test]
    fn sentence_count_never_zero() {
        assert_eq!(sentence_count("no terminator here"), 1);
        assert_eq!(sentence_count(""), 1);
    }

    #[test]
    fn detection_probabilities_complement() {
        let (ai, human) = detect("The quick brown fox jumps over the lazy dog. It was fast.");
        assert!((ai + human - 1.0).abs() < 1e-3);
        assert!((0.0..=1.0).contains(&ai));
    }

    #[test]
    fn repetitive_run_on_text_scores_high() {
        let text = "the cat sat on the mat ".repeat(10);
        let (ai, _) = detect(&text);
        assert!(ai >= 0.7, "expected high AI score, got {ai}");
    }

    #[test]
    fn diverse_short_sentences_score_low() {
        let text = "Birds sing. Rivers flow. Children laugh loudly. Markets open early. \
                    Rain falls gently. Dogs bark sometimes.";
        let (ai, _) = detect(text);
        assert!(ai < 0.4, "expected low AI score, got {ai}");
    }

    #[test]
    fn label_overlap_prefers_matching_tokens() {
        let labels = vec!["Billing Problem".to_string(), "Login Failure".to_string()];
        let ranked = label_overlap("I cannot login to my account", &labels);
        assert_eq!(ranked[0].0, "Login Failure");
        assert!(ranked[0].1 > ranked[1].1);
    }

    #[test]
    fn label_overlap_ties_keep_input_order() {
        let labels = vec![
            "Very Positive".to_string(),
            "Positive".to_string(),
            "Neutral".to_string(),
        ];
        let ranked = label_overlap("I love this product, it changed my life!", &labels);
        // No token matches anywhere, all scores zero, first label wins
        assert_eq!(ranked[0].0, "Very Positive");
    }

    #[test]
    fn top_tokens_rank_by_frequency() {
        let tokens = top_tokens("kubernetes kubernetes docker terraform docker kubernetes", 2);
        assert_eq!(tokens, vec!["kubernetes".to_string(), "docker".to_string()]);
    }

    #[test]
    fn keyword_candidates_skip_short_words(){
        let kws = keyword_candidates("the payment gateway is down again", 5);
        assert_eq!(kws, vec!["payment".to_string(), "gateway".to_string(), "again".to_string()]);
    }
}
