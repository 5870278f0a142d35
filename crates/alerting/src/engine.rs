//! Recommendation Engine Implementation

use crate::advisory::advisory_text;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vitals_core::{Recommendation, SeverityLabel, Verdict};

/// Recommendation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// SpO2 below this value is reported as low oxygen (default: 95)
    pub low_spo2_threshold: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            low_spo2_threshold: 95,
        }
    }
}

/// Priority-ordered severity selection
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    /// Create a new recommendation engine
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Pick the single severity label for a verdict
    ///
    /// First match wins: anomaly, arrhythmia, bradycardia, tachycardia, low
    /// oxygen, then normal.
    pub fn select_label(&self, verdict: &Verdict, spo2: u32) -> SeverityLabel {
        if let Some(condition) = verdict.flagged().next() {
            return SeverityLabel::from(condition);
        }
        if spo2 < self.config.low_spo2_threshold {
            SeverityLabel::LowOxygen
        } else {
            SeverityLabel::Normal
        }
    }

    /// Derive the recommendation for a verdict and reading pair
    pub fn recommend(&self, verdict: &Verdict, heart_rate: u32, spo2: u32) -> Recommendation {
        let severity = self.select_label(verdict, spo2);
        debug!("Selected severity '{}' for {:?}", severity, verdict);
        Recommendation {
            severity,
            advisory: advisory_text(severity, heart_rate, spo2),
        }
    }
}
