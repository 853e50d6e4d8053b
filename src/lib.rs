//! Text intelligence backend: AI-content detection, text generation,
//! classification, and document Q&A over a hosted inference API, with
//! deterministic heuristic fallbacks when the model is unavailable.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod heuristics;
pub mod jsonrepair;
pub mod logging;
pub mod middleware;
pub mod prompts;
pub mod routes;
pub mod services;
