//! Ensemble Execution

use crate::classifier::ClassifierSlots;
use crate::policy::{resolve_verdict, Decision};
use data_validator::coerce_or_zero;
use fallback::FallbackEngine;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use vitals_core::{Condition, Verdict, VitalChannel};

/// A classifier that errored during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifierFailure {
    pub condition: Condition,
    pub reason: String,
}

/// Result of running every loaded classifier once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsembleRun {
    /// Combined verdict; failed or absent classifiers contribute `false`
    pub verdict: Verdict,
    /// Classifiers that ran
    pub loaded: usize,
    pub failures: Vec<ClassifierFailure>,
}

/// First decision step: ensemble verdict or "no classifier available"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsembleOutcome {
    Unavailable,
    Ran(EnsembleRun),
}

/// Classifier ensemble with rule-based fallback
pub struct ClassifierEnsemble {
    slots: ClassifierSlots,
    fallback: FallbackEngine,
}

impl ClassifierEnsemble {
    /// Create an ensemble from loaded slots and a fallback engine
    pub fn new(slots: ClassifierSlots, fallback: FallbackEngine) -> Self {
        debug!("Classifier ensemble with loaded slots {:?}", slots);
        Self { slots, fallback }
    }

    /// Ensemble with no classifiers; every verdict comes from the fallback
    pub fn rules_only(fallback: FallbackEngine) -> Self {
        Self::new(ClassifierSlots::empty(), fallback)
    }

    /// Run every loaded classifier in isolation
    pub fn run_classifiers(&self, heart_rate: u32, spo2: u32) -> EnsembleOutcome {
        if self.slots.is_empty() {
            return EnsembleOutcome::Unavailable;
        }

        let mut verdict = Verdict::CLEAR;
        let mut failures = Vec::new();
        let mut loaded = 0;

        for condition in Condition::ALL {
            let Some(classifier) = self.slots.get(condition) else {
                continue;
            };
            loaded += 1;

            match classifier.score(heart_rate, spo2) {
                Ok(score) => verdict.set(condition, score.detected()),
                Err(e) => {
                    warn!("{} classifier failed: {}", condition, e);
                    metrics::counter!(
                        "vitals_classifier_failures_total",
                        "classifier" => condition.as_str()
                    )
                    .increment(1);
                    failures.push(ClassifierFailure {
                        condition,
                        reason: e.to_string(),
                    });
                }
            }
        }

        EnsembleOutcome::Ran(EnsembleRun {
            verdict,
            loaded,
            failures,
        })
    }

    /// Classify a reading pair
    pub fn classify(&self, heart_rate: u32, spo2: u32) -> Decision {
        let outcome = self.run_classifiers(heart_rate, spo2);
        resolve_verdict(outcome, &self.fallback, heart_rate, spo2)
    }

    /// Classify loosely-typed readings; malformed values are treated as zero
    pub fn classify_raw(&self, heart_rate: &Value, spo2: &Value) -> Decision {
        let hr = coerce_or_zero(VitalChannel::HeartRate, heart_rate);
        let sp = coerce_or_zero(VitalChannel::Spo2, spo2);
        self.classify(hr, sp)
    }

    /// Number of loaded classifiers
    pub fn loaded_count(&self) -> usize {
        self.slots.loaded_count()
    }

    /// Conditions with a loaded classifier
    pub fn loaded(&self) -> Vec<Condition> {
        self.slots.loaded().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{from_fn, Score};
    use crate::InferenceError;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use vitals_core::VerdictSource;

    fn negative() -> impl crate::Classifier {
        from_fn(|_, _| Ok(Score::Coded(0)))
    }

    fn positive() -> impl crate::Classifier {
        from_fn(|_, _| Ok(Score::Coded(1)))
    }

    fn failing() -> impl crate::Classifier {
        from_fn(|_, _| Err(InferenceError::InferenceFailed("bad tensor".to_string())))
    }

    #[test]
    fn test_no_classifiers_uses_fallback() {
        let ensemble = ClassifierEnsemble::rules_only(FallbackEngine::default());
        assert_eq!(ensemble.run_classifiers(72, 98), EnsembleOutcome::Unavailable);

        let decision = ensemble.classify(35, 98);
        assert_eq!(decision.source, VerdictSource::Fallback);
        assert_eq!(decision.verdict, FallbackEngine::default().evaluate(35, 98));
    }

    #[test]
    fn test_failure_does_not_stop_other_classifiers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = calls.clone();
            from_fn(move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Score::Coded(1))
            })
        };

        let slots = ClassifierSlots::empty()
            .with(Condition::Anomaly, failing())
            .with(Condition::Arrhythmia, failing())
            .with(Condition::Tachycardia, counted);
        let ensemble = ClassifierEnsemble::new(slots, FallbackEngine::default());

        match ensemble.run_classifiers(120, 97) {
            EnsembleOutcome::Ran(run) => {
                assert_eq!(run.loaded, 3);
                assert_eq!(run.failures.len(), 2);
                assert_eq!(run.failures[0].condition, Condition::Anomaly);
                assert!(!run.verdict.anomaly);
                assert!(run.verdict.tachycardia);
            }
            EnsembleOutcome::Unavailable => panic!("classifiers were loaded"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_anomaly_presence_score() {
        let slots = ClassifierSlots::empty()
            .with(Condition::Anomaly, from_fn(|hr, _| Ok(Score::Presence(hr > 150))));
        let ensemble = ClassifierEnsemble::new(slots, FallbackEngine::default());

        let decision = ensemble.classify(160, 98);
        assert_eq!(decision.source, VerdictSource::Ensemble);
        assert!(decision.verdict.anomaly);
    }

    #[test]
    fn test_malformed_heart_rate_coerced_to_zero() {
        let ensemble = ClassifierEnsemble::rules_only(FallbackEngine::default());
        let decision = ensemble.classify_raw(&json!("abc"), &json!(97));
        assert!(decision.verdict.anomaly);
        assert_eq!(decision, ensemble.classify(0, 97));
    }

    #[test]
    fn test_all_failing_classifiers_fall_back_when_rules_flag() {
        let slots = ClassifierSlots::empty()
            .with(Condition::Anomaly, failing())
            .with(Condition::Bradycardia, failing());
        let ensemble = ClassifierEnsemble::new(slots, FallbackEngine::default());

        let decision = ensemble.classify(50, 98);
        assert_eq!(decision.source, VerdictSource::FallbackOverride);
        assert!(decision.verdict.bradycardia);
        assert_eq!(decision.failures.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_empty_ensemble_equals_fallback(hr in 0u32..300, spo2 in 0u32..110) {
            let fallback = FallbackEngine::default();
            let ensemble = ClassifierEnsemble::rules_only(fallback.clone());
            prop_assert_eq!(ensemble.classify(hr, spo2).verdict, fallback.evaluate(hr, spo2));
        }

        #[test]
        fn prop_negative_ensemble_takes_any_fallback_flag(hr in 0u32..300, spo2 in 0u32..110) {
            let fallback = FallbackEngine::default();
            let slots = ClassifierSlots::empty()
                .with(Condition::Arrhythmia, negative())
                .with(Condition::Bradycardia, negative());
            let ensemble = ClassifierEnsemble::new(slots, fallback.clone());

            let rules = fallback.evaluate(hr, spo2);
            let decision = ensemble.classify(hr, spo2);
            if rules.any() {
                prop_assert_eq!(decision.verdict, rules);
                prop_assert_eq!(decision.source, VerdictSource::FallbackOverride);
            } else {
                prop_assert_eq!(decision.verdict, Verdict::CLEAR);
                prop_assert_eq!(decision.source, VerdictSource::Ensemble);
            }
        }

        #[test]
        fn prop_positive_ensemble_is_never_overridden(hr in 0u32..300, spo2 in 0u32..110) {
            let slots = ClassifierSlots::empty()
                .with(Condition::Tachycardia, positive())
                .with(Condition::Anomaly, negative());
            let ensemble = ClassifierEnsemble::new(slots, FallbackEngine::default());

            let decision = ensemble.classify(hr, spo2);
            prop_assert_eq!(decision.source, VerdictSource::Ensemble);
            prop_assert_eq!(decision.verdict, Verdict { tachycardia: true, ..Verdict::CLEAR });
        }

        #[test]
        fn prop_classify_is_pure(hr in 0u32..300, spo2 in 0u32..110) {
            let slots = ClassifierSlots::empty()
                .with(Condition::Bradycardia, from_fn(|hr, _| Ok(Score::Coded(i64::from(hr < 55)))));
            let ensemble = ClassifierEnsemble::new(slots, FallbackEngine::default());
            prop_assert_eq!(ensemble.classify(hr, spo2), ensemble.classify(hr, spo2));
        }
    }
}
