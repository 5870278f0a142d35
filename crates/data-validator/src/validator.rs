//! Plausibility Range Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use vitals_core::VitalChannel;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Plausible heart rate range (bpm)
    pub heart_rate_range: (u32, u32),
    /// Plausible SpO2 range (%)
    pub spo2_range: (u32, u32),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            heart_rate_range: (0, 300),
            spo2_range: (0, 100),
        }
    }
}

/// Plausibility validator for vital-sign readings
///
/// An implausible reading is still a reading; callers log the error as a
/// data-quality warning and keep the value.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Ranges this validator checks against
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: u32,
        range: (u32, u32),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value: f64::from(value),
                min: f64::from(range.0),
                max: f64::from(range.1),
            })
        } else {
            Ok(())
        }
    }

    /// Validate heart rate
    pub fn validate_heart_rate(&self, bpm: u32) -> Result<(), ValidationError> {
        self.validate_range("heart_rate", bpm, self.config.heart_rate_range)
    }

    /// Validate SpO2
    pub fn validate_spo2(&self, percent: u32) -> Result<(), ValidationError> {
        self.validate_range("spo2", percent, self.config.spo2_range)
    }

    /// Validate a reading for the given channel
    pub fn validate(&self, channel: VitalChannel, value: u32) -> Result<(), ValidationError> {
        match channel {
            VitalChannel::HeartRate => self.validate_heart_rate(value),
            VitalChannel::Spo2 => self.validate_spo2(value),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
