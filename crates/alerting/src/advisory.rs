//! Advisory Templates

use vitals_core::SeverityLabel;

/// Advisory text for a label, parameterized by the current readings
pub fn advisory_text(label: SeverityLabel, heart_rate: u32, spo2: u32) -> String {
    match label {
        SeverityLabel::AnomalyDetected => format!(
            "ANOMALY DETECTED: Unusual vital-sign pattern (HR: {} BPM, SpO2: {}%). \
             Readings fall outside normal ranges and may indicate more than one underlying issue. \
             Monitor closely for the next 15-30 minutes. Seek emergency care for dizziness, \
             chest pain or shortness of breath, and contact a healthcare provider for evaluation.",
            heart_rate, spo2
        ),
        SeverityLabel::ArrhythmiaDetected => format!(
            "IRREGULAR HEART RHYTHM: The heart may be beating too fast, too slow or irregularly \
             (HR: {} BPM). Sit or lie down and breathe slowly. Avoid caffeine, alcohol and \
             strenuous activity. Seek medical attention for chest pain, severe shortness of \
             breath, dizziness or fainting, and keep a record of each episode.",
            heart_rate
        ),
        SeverityLabel::BradycardiaDetected => format!(
            "LOW HEART RATE: {} BPM is below the normal resting range (60-100 BPM). \
             This can be normal for athletes but may indicate an underlying condition. \
             Watch for fatigue, dizziness, weakness, confusion or fainting. Sit or lie down and \
             avoid sudden movements. Contact a doctor if it persists; call emergency services \
             for fainting or chest pain.",
            heart_rate
        ),
        SeverityLabel::TachycardiaDetected => format!(
            "ELEVATED HEART RATE: {} BPM exceeds the normal resting range (60-100 BPM). \
             Sit down, relax and breathe slowly (in for 4, hold for 4, out for 4). Avoid \
             caffeine, energy drinks, alcohol and strenuous activity. Seek medical attention if \
             the rate stays above 120 BPM at rest or with chest pain, severe shortness of breath \
             or dizziness.",
            heart_rate
        ),
        SeverityLabel::LowOxygen => format!(
            "OXYGEN SATURATION LOW: SpO2 of {}% is below the healthy range (95-100%). \
             Sit upright, breathe slowly and deeply, and move to fresh air if possible. \
             SpO2 below 90% requires immediate medical attention, as do bluish lips, chest pain \
             or confusion.",
            spo2
        ),
        SeverityLabel::Normal => format!(
            "HEALTHY VITALS: Heart rate {} BPM (normal 60-100) and SpO2 {}% (normal 95-100) are \
             within normal ranges. Keep up regular activity, balanced meals, hydration and 7-9 \
             hours of sleep, and report significant changes to a healthcare provider.",
            heart_rate, spo2
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_label_has_text() {
        for label in SeverityLabel::ALL {
            assert!(!advisory_text(label, 72, 98).is_empty());
        }
    }

    #[test]
    fn test_templates_embed_readings() {
        assert!(advisory_text(SeverityLabel::BradycardiaDetected, 48, 97).contains("48 BPM"));
        assert!(advisory_text(SeverityLabel::LowOxygen, 80, 91).contains("91%"));
        let normal = advisory_text(SeverityLabel::Normal, 66, 99);
        assert!(normal.contains("66 BPM") && normal.contains("99%"));
    }
}
