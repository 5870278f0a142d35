//! Reading Coercion

use crate::error::ValidationError;
use serde_json::Value;
use tracing::warn;
use vitals_core::VitalChannel;

/// Parse a reading into a non-negative integer
///
/// Accepts JSON numbers and numeric strings; fractional values are truncated
/// toward zero (`72.9` → `72`).
pub fn parse_reading(value: &Value) -> Result<u32, ValidationError> {
    let number = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::NotNumeric(n.to_string()))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::NotNumeric(format!("{:?}", s)))?,
        Value::Null => return Err(ValidationError::MissingField("value")),
        other => return Err(ValidationError::NotNumeric(other.to_string())),
    };

    if !number.is_finite() {
        return Err(ValidationError::NotNumeric(number.to_string()));
    }
    if number < 0.0 {
        return Err(ValidationError::Negative(number));
    }

    let truncated = number.trunc();
    if truncated > f64::from(u32::MAX) {
        return Err(ValidationError::OutOfRange {
            field: "reading",
            value: number,
            min: 0.0,
            max: f64::from(u32::MAX),
        });
    }

    Ok(truncated as u32)
}

/// Coerce a reading for classification, substituting zero for bad input
///
/// A bad reading never aborts a cycle; it is logged as a data-quality warning.
pub fn coerce_or_zero(channel: VitalChannel, value: &Value) -> u32 {
    match parse_reading(value) {
        Ok(reading) => reading,
        Err(e) => {
            warn!(channel = channel.as_str(), "Invalid {} input ({}), using 0", channel.as_str(), e);
            metrics::counter!("vitals_coerced_readings_total", "channel" => channel.as_str())
                .increment(1);
            0
        }
    }
}
