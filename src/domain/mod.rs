//! Request/response shapes for the API.
//!
//! Everything here is transient: built per request, serialized, discarded.

pub mod assistant;
pub mod classification;
pub mod detection;
pub mod generation;

use serde::Deserialize;

/// Numeric field that browsers send either as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(i64),
    Text(String),
}

impl NumberOrString {
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Self::Number(n) if *n > 0 => Some(*n as usize),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse::<usize>().ok().filter(|n| *n > 0),
        }
    }
}
