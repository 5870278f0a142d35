//! Rule-Based Fallback System
//!
//! Provides threshold heuristics when ML classification is unavailable.

mod rules;

pub use rules::{FallbackEngine, Thresholds};
