//! Recommendation Types

use crate::verdict::Condition;
use serde::{Deserialize, Serialize};

/// Severity label selected for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLabel {
    #[serde(rename = "Anomaly Detected")]
    AnomalyDetected,
    #[serde(rename = "Arrhythmia Detected")]
    ArrhythmiaDetected,
    #[serde(rename = "Bradycardia Detected")]
    BradycardiaDetected,
    #[serde(rename = "Tachycardia Detected")]
    TachycardiaDetected,
    #[serde(rename = "Low Oxygen Levels")]
    LowOxygen,
    #[serde(rename = "Normal")]
    Normal,
}

impl SeverityLabel {
    /// All labels, highest priority first
    pub const ALL: [SeverityLabel; 6] = [
        SeverityLabel::AnomalyDetected,
        SeverityLabel::ArrhythmiaDetected,
        SeverityLabel::BradycardiaDetected,
        SeverityLabel::TachycardiaDetected,
        SeverityLabel::LowOxygen,
        SeverityLabel::Normal,
    ];

    /// Display label as written to the sinks
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLabel::AnomalyDetected => "Anomaly Detected",
            SeverityLabel::ArrhythmiaDetected => "Arrhythmia Detected",
            SeverityLabel::BradycardiaDetected => "Bradycardia Detected",
            SeverityLabel::TachycardiaDetected => "Tachycardia Detected",
            SeverityLabel::LowOxygen => "Low Oxygen Levels",
            SeverityLabel::Normal => "Normal",
        }
    }

    /// Whether the label represents anything other than normal vitals
    pub fn is_alert(&self) -> bool {
        !matches!(self, SeverityLabel::Normal)
    }
}

impl From<Condition> for SeverityLabel {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Anomaly => SeverityLabel::AnomalyDetected,
            Condition::Arrhythmia => SeverityLabel::ArrhythmiaDetected,
            Condition::Bradycardia => SeverityLabel::BradycardiaDetected,
            Condition::Tachycardia => SeverityLabel::TachycardiaDetected,
        }
    }
}

impl std::fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One severity label with its advisory text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: SeverityLabel,
    pub advisory: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serializes_as_display_text() {
        let json = serde_json::to_string(&SeverityLabel::LowOxygen).unwrap();
        assert_eq!(json, "\"Low Oxygen Levels\"");

        for label in SeverityLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
        }
    }

    #[test]
    fn test_condition_label_mapping() {
        assert_eq!(SeverityLabel::from(Condition::Anomaly), SeverityLabel::AnomalyDetected);
        assert_eq!(SeverityLabel::from(Condition::Tachycardia), SeverityLabel::TachycardiaDetected);
        assert!(!SeverityLabel::Normal.is_alert());
        assert!(SeverityLabel::LowOxygen.is_alert());
    }
}
