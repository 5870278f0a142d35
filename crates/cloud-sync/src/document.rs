//! Realtime-database document layout

use serde::{Deserialize, Serialize};
use vitals_core::CycleRecord;

/// Flat key-value document stored for each cycle
///
/// Key names are the ones the dashboard reads. Arrhythmia, bradycardia and
/// tachycardia are stored as 0/1 integers; anomaly is a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudDocument {
    #[serde(rename = "HeartRate")]
    pub heart_rate: u32,
    #[serde(rename = "SpO2")]
    pub spo2: u32,
    pub anomaly: bool,
    pub arrhythmia: u8,
    pub bradycardia: u8,
    pub tachycardia: u8,
    /// Severity label
    pub prediction: String,
    /// Advisory text
    pub recommendation: String,
    /// Cycle time
    pub timestamp: String,
    /// When the newest reading was observed
    pub sensor_timestamp: String,
    pub verdict_source: String,
}

impl From<&CycleRecord> for CloudDocument {
    fn from(record: &CycleRecord) -> Self {
        let verdict = &record.verdict;
        Self {
            heart_rate: record.measurement.heart_rate,
            spo2: record.measurement.spo2,
            anomaly: verdict.anomaly,
            arrhythmia: u8::from(verdict.arrhythmia),
            bradycardia: u8::from(verdict.bradycardia),
            tachycardia: u8::from(verdict.tachycardia),
            prediction: record.recommendation.severity.as_str().to_string(),
            recommendation: record.recommendation.advisory.clone(),
            timestamp: record.timestamp_iso(),
            sensor_timestamp: record.measurement.observed_at.to_rfc3339(),
            verdict_source: record.verdict_source.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vitals_core::{Measurement, Recommendation, SeverityLabel, Verdict, VerdictSource};

    #[test]
    fn test_document_uses_dashboard_keys() {
        let record = CycleRecord::new(
            3,
            Measurement::new(35, 98),
            Verdict {
                anomaly: true,
                arrhythmia: true,
                bradycardia: true,
                tachycardia: false,
            },
            VerdictSource::Fallback,
            Recommendation {
                severity: SeverityLabel::AnomalyDetected,
                advisory: "Seek medical attention".to_string(),
            },
        );

        let value = serde_json::to_value(CloudDocument::from(&record)).unwrap();

        assert_eq!(value["HeartRate"], json!(35));
        assert_eq!(value["SpO2"], json!(98));
        assert_eq!(value["anomaly"], json!(true));
        assert_eq!(value["arrhythmia"], json!(1));
        assert_eq!(value["bradycardia"], json!(1));
        assert_eq!(value["tachycardia"], json!(0));
        assert_eq!(value["prediction"], json!("Anomaly Detected"));
        assert_eq!(value["recommendation"], json!("Seek medical attention"));
        assert_eq!(value["timestamp"], json!(record.timestamp_iso()));
        assert!(value["sensor_timestamp"].is_string());
    }
}
