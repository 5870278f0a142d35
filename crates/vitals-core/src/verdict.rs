//! Classification Verdict

use serde::{Deserialize, Serialize};

/// Named physiological conditions, in recommendation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Anomaly,
    Arrhythmia,
    Bradycardia,
    Tachycardia,
}

impl Condition {
    /// All conditions, highest priority first
    pub const ALL: [Condition; 4] = [
        Condition::Anomaly,
        Condition::Arrhythmia,
        Condition::Bradycardia,
        Condition::Tachycardia,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Anomaly => "anomaly",
            Condition::Arrhythmia => "arrhythmia",
            Condition::Bradycardia => "bradycardia",
            Condition::Tachycardia => "tachycardia",
        }
    }

    /// Slot index in fixed-size per-condition tables
    pub fn index(&self) -> usize {
        match self {
            Condition::Anomaly => 0,
            Condition::Arrhythmia => 1,
            Condition::Bradycardia => 2,
            Condition::Tachycardia => 3,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-flag classification result for one measurement pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verdict {
    pub anomaly: bool,
    pub arrhythmia: bool,
    pub bradycardia: bool,
    pub tachycardia: bool,
}

impl Verdict {
    /// Verdict with no condition flagged
    pub const CLEAR: Verdict = Verdict {
        anomaly: false,
        arrhythmia: false,
        bradycardia: false,
        tachycardia: false,
    };

    /// Whether any condition is flagged
    pub fn any(&self) -> bool {
        self.anomaly || self.arrhythmia || self.bradycardia || self.tachycardia
    }

    /// Whether a specific condition is flagged
    pub fn is_set(&self, condition: Condition) -> bool {
        match condition {
            Condition::Anomaly => self.anomaly,
            Condition::Arrhythmia => self.arrhythmia,
            Condition::Bradycardia => self.bradycardia,
            Condition::Tachycardia => self.tachycardia,
        }
    }

    /// Set a specific condition flag
    pub fn set(&mut self, condition: Condition, detected: bool) {
        match condition {
            Condition::Anomaly => self.anomaly = detected,
            Condition::Arrhythmia => self.arrhythmia = detected,
            Condition::Bradycardia => self.bradycardia = detected,
            Condition::Tachycardia => self.tachycardia = detected,
        }
    }

    /// Flagged conditions, highest priority first
    pub fn flagged(&self) -> impl Iterator<Item = Condition> + '_ {
        Condition::ALL.into_iter().filter(|c| self.is_set(*c))
    }
}

/// Which decision step produced the final verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// Loaded classifiers produced the verdict
    Ensemble,
    /// No classifier was loaded; thresholds produced the verdict
    Fallback,
    /// Classifiers were all negative but thresholds flagged a condition
    FallbackOverride,
}

impl VerdictSource {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictSource::Ensemble => "ensemble",
            VerdictSource::Fallback => "fallback",
            VerdictSource::FallbackOverride => "fallback_override",
        }
    }
}
