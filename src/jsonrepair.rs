//! Best-effort repair of near-valid JSON produced by the model.
//!
//! Models asked for "minified JSON only" still wrap output in code fences,
//! add commentary, leave trailing commas, or emit unquoted keys and
//! single-quoted strings. `repair` fixes those cases and validates the
//! result with serde_json; anything it cannot salvage is an error so the
//! caller can take its fallback path.

use anyhow::{anyhow, Result};
use serde_json::Value;

/// Extract the outermost `{...}` span, mirroring a greedy brace match:
/// first opening brace to last closing brace.
pub fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Repair near-valid JSON and parse it.
pub fn repair(raw: &str) -> Result<Value> {
    let stripped = strip_code_fences(raw);
    let candidate =
        extract_object(&stripped).ok_or_else(|| anyhow!("no JSON object in model output"))?;

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Ok(value);
    }

    let fixed = quote_bare_keys(&normalize_quotes(&remove_trailing_commas(candidate)));
    serde_json::from_str::<Value>(&fixed).map_err(|e| anyhow!("unrepairable JSON: {e}"))
}

fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove `,` immediately preceding `}` or `]`, outside of strings.
fn remove_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                while out.ends_with(|p: char| p.is_whitespace()) {
                    out.pop();
                }
                if out.ends_with(',') {
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Convert single-quoted strings to double-quoted, outside of existing
/// double-quoted strings.
fn normalize_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(c);
            }
            '\'' if !in_double => {
                in_single = !in_single;
                out.push('"');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Quote bare object keys: `{key: 1}` -> `{"key": 1}`.
fn quote_bare_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut expecting_key = false;
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                expecting_key = false;
                out.push(c);
                i += 1;
            }
            '{' | ',' => {
                expecting_key = true;
                out.push(c);
                i += 1;
            }
            c if expecting_key && (c.is_ascii_alphabetic() || c == '_') => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                // Only treat it as a key if a colon follows
                let mut j = i;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ':' {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    out.push_str(&word);
                }
                expecting_key = false;
            }
            c if c.is_whitespace() => {
                out.push(c);
                i += 1;
            }
            _ => {
                expecting_key = false;
                out.push(c);
                i += 1;
            }
        }
    }
    out
}
