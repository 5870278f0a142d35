//! Alerting System
//!
//! Maps a classification verdict to exactly one severity label and its
//! advisory text.

mod advisory;
mod engine;

pub use advisory::advisory_text;
pub use engine::{RecommendationConfig, RecommendationEngine};
