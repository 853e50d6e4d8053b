//! API response envelope and helpers

pub mod response;

pub use response::Envelope;
