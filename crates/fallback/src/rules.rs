//! Threshold Rules

use serde::{Deserialize, Serialize};
use tracing::trace;
use vitals_core::Verdict;

/// Threshold table for the rule-based verdict
///
/// All bounds are strict: a reading equal to a bound does not trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Anomaly below this heart rate (bpm)
    pub anomaly_hr_low: u32,
    /// Anomaly above this heart rate (bpm)
    pub anomaly_hr_high: u32,
    /// Anomaly below this SpO2 (%)
    pub anomaly_spo2_low: u32,
    /// Arrhythmia below this heart rate (bpm)
    pub arrhythmia_hr_low: u32,
    /// Arrhythmia above this heart rate (bpm)
    pub arrhythmia_hr_high: u32,
    /// Bradycardia below this heart rate (bpm)
    pub bradycardia_hr: u32,
    /// Tachycardia above this heart rate (bpm)
    pub tachycardia_hr: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            anomaly_hr_low: 40,
            anomaly_hr_high: 140,
            anomaly_spo2_low: 90,
            arrhythmia_hr_low: 45,
            arrhythmia_hr_high: 130,
            bradycardia_hr: 60,
            tachycardia_hr: 100,
        }
    }
}

/// Deterministic threshold evaluator
#[derive(Debug, Clone, Default)]
pub struct FallbackEngine {
    thresholds: Thresholds,
}

impl FallbackEngine {
    /// Create a fallback engine with a threshold table
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate the threshold table against a reading pair
    pub fn evaluate(&self, heart_rate: u32, spo2: u32) -> Verdict {
        let t = &self.thresholds;
        let verdict = Verdict {
            anomaly: heart_rate < t.anomaly_hr_low
                || heart_rate > t.anomaly_hr_high
                || spo2 < t.anomaly_spo2_low,
            arrhythmia: heart_rate < t.arrhythmia_hr_low || heart_rate > t.arrhythmia_hr_high,
            bradycardia: heart_rate < t.bradycardia_hr,
            tachycardia: heart_rate > t.tachycardia_hr,
        };
        trace!("Fallback verdict for HR={} SpO2={}: {:?}", heart_rate, spo2, verdict);
        verdict
    }

    /// Get the threshold table
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normal_vitals() {
        let engine = FallbackEngine::default();
        assert_eq!(engine.evaluate(72, 98), Verdict::CLEAR);
    }

    #[test]
    fn test_severe_bradycardia() {
        let engine = FallbackEngine::default();
        let verdict = engine.evaluate(35, 98);
        assert!(verdict.anomaly);
        assert!(verdict.arrhythmia);
        assert!(verdict.bradycardia);
        assert!(!verdict.tachycardia);
    }

    #[test]
    fn test_mild_tachycardia() {
        let engine = FallbackEngine::default();
        let verdict = engine.evaluate(110, 93);
        assert_eq!(
            verdict,
            Verdict {
                tachycardia: true,
                ..Verdict::CLEAR
            }
        );
    }

    #[test]
    fn test_low_spo2_is_anomaly_only() {
        let engine = FallbackEngine::default();
        let verdict = engine.evaluate(80, 85);
        assert!(verdict.anomaly);
        assert!(!verdict.arrhythmia && !verdict.bradycardia && !verdict.tachycardia);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let engine = FallbackEngine::default();
        assert_eq!(engine.evaluate(60, 90), Verdict::CLEAR);
        assert_eq!(engine.evaluate(100, 90), Verdict::CLEAR);
        assert!(engine.evaluate(59, 90).bradycardia);
        assert!(engine.evaluate(101, 90).tachycardia);
        assert!(engine.evaluate(131, 95).arrhythmia);
        assert!(!engine.evaluate(131, 95).anomaly);
        assert!(engine.evaluate(141, 95).anomaly);
        assert!(engine.evaluate(44, 95).arrhythmia);
        assert!(engine.evaluate(39, 95).anomaly);
    }

    #[test]
    fn test_zero_reading_flags_anomaly() {
        let engine = FallbackEngine::default();
        assert!(engine.evaluate(0, 97).anomaly);
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = FallbackEngine::new(Thresholds {
            tachycardia_hr: 120,
            ..Default::default()
        });
        assert!(!engine.evaluate(110, 98).tachycardia);
        assert!(engine.evaluate(121, 98).tachycardia);
    }

    proptest! {
        #[test]
        fn prop_evaluate_is_deterministic(hr in 0u32..400, spo2 in 0u32..120) {
            let engine = FallbackEngine::default();
            prop_assert_eq!(engine.evaluate(hr, spo2), engine.evaluate(hr, spo2));
        }

        #[test]
        fn prop_brady_and_tachy_are_exclusive(hr in 0u32..400, spo2 in 0u32..120) {
            let verdict = FallbackEngine::default().evaluate(hr, spo2);
            prop_assert!(!(verdict.bradycardia && verdict.tachycardia));
        }
    }
}
