//! Topic Payload Extraction

use crate::coerce::parse_reading;
use crate::error::ValidationError;
use serde_json::Value;
use vitals_core::VitalChannel;

/// Keys searched for a reading, in order, per channel
pub fn payload_keys(channel: VitalChannel) -> &'static [&'static str] {
    match channel {
        VitalChannel::HeartRate => &["value", "HeartRate", "hr"],
        VitalChannel::Spo2 => &["value", "SpO2", "spo2"],
    }
}

/// Extract a reading from a raw topic payload
///
/// The payload is either a JSON object carrying the reading under one of
/// [`payload_keys`], or a bare JSON number/numeric string.
pub fn extract_reading(channel: VitalChannel, payload: &[u8]) -> Result<u32, ValidationError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| ValidationError::InvalidFormat(e.to_string()))?;

    match &value {
        Value::Object(map) => {
            let raw = payload_keys(channel)
                .iter()
                .find_map(|key| map.get(*key))
                .ok_or(ValidationError::MissingField("value"))?;
            parse_reading(raw)
        }
        _ => parse_reading(&value),
    }
}
