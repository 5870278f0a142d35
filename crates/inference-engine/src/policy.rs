//! Fallback Override Policy
//!
//! Second decision step. Asymmetric by contract: a positive ensemble verdict
//! is final, while an all-negative one yields to any threshold flag.

use crate::ensemble::{ClassifierFailure, EnsembleOutcome};
use fallback::FallbackEngine;
use serde::Serialize;
use tracing::{debug, warn};
use vitals_core::{Verdict, VerdictSource};

/// Final classification decision for one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub source: VerdictSource,
    /// Classifiers that errored during this decision
    pub failures: Vec<ClassifierFailure>,
}

/// Resolve the final verdict from the ensemble outcome
pub fn resolve_verdict(
    outcome: EnsembleOutcome,
    fallback: &FallbackEngine,
    heart_rate: u32,
    spo2: u32,
) -> Decision {
    match outcome {
        EnsembleOutcome::Unavailable => {
            debug!("No classifiers loaded, using rule-based verdict");
            metrics::counter!("vitals_fallback_total", "reason" => "unavailable").increment(1);
            Decision {
                verdict: fallback.evaluate(heart_rate, spo2),
                source: VerdictSource::Fallback,
                failures: Vec::new(),
            }
        }
        EnsembleOutcome::Ran(run) if run.verdict.any() => Decision {
            verdict: run.verdict,
            source: VerdictSource::Ensemble,
            failures: run.failures,
        },
        EnsembleOutcome::Ran(run) => {
            let rules = fallback.evaluate(heart_rate, spo2);
            if rules.any() {
                warn!(
                    "Classifiers returned no flags, using rule-based verdict {:?} (HR={}, SpO2={})",
                    rules, heart_rate, spo2
                );
                metrics::counter!("vitals_fallback_total", "reason" => "override").increment(1);
                Decision {
                    verdict: rules,
                    source: VerdictSource::FallbackOverride,
                    failures: run.failures,
                }
            } else {
                Decision {
                    verdict: run.verdict,
                    source: VerdictSource::Ensemble,
                    failures: run.failures,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::EnsembleRun;

    fn ran(verdict: Verdict) -> EnsembleOutcome {
        EnsembleOutcome::Ran(EnsembleRun {
            verdict,
            loaded: 4,
            failures: Vec::new(),
        })
    }

    #[test]
    fn test_unavailable_uses_rules() {
        let fallback = FallbackEngine::default();
        let decision = resolve_verdict(EnsembleOutcome::Unavailable, &fallback, 72, 98);
        assert_eq!(decision.verdict, Verdict::CLEAR);
        assert_eq!(decision.source, VerdictSource::Fallback);
    }

    #[test]
    fn test_negative_ensemble_overridden_by_rules() {
        let fallback = FallbackEngine::default();
        let decision = resolve_verdict(ran(Verdict::CLEAR), &fallback, 35, 98);
        assert_eq!(decision.source, VerdictSource::FallbackOverride);
        assert_eq!(decision.verdict, fallback.evaluate(35, 98));
    }

    #[test]
    fn test_negative_ensemble_kept_when_rules_clear() {
        let fallback = FallbackEngine::default();
        let decision = resolve_verdict(ran(Verdict::CLEAR), &fallback, 72, 98);
        assert_eq!(decision.source, VerdictSource::Ensemble);
        assert_eq!(decision.verdict, Verdict::CLEAR);
    }

    #[test]
    fn test_positive_ensemble_not_overridden() {
        let fallback = FallbackEngine::default();
        let verdict = Verdict {
            arrhythmia: true,
            ..Verdict::CLEAR
        };
        // Rules would flag anomaly, arrhythmia and bradycardia here
        let decision = resolve_verdict(ran(verdict), &fallback, 35, 98);
        assert_eq!(decision.source, VerdictSource::Ensemble);
        assert_eq!(decision.verdict, verdict);
    }
}
