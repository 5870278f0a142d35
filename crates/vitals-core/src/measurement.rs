//! Measurement Snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Heart rate assumed before the first reading arrives (bpm)
pub const INITIAL_HEART_RATE: u32 = 70;

/// SpO2 assumed before the first reading arrives (%)
pub const INITIAL_SPO2: u32 = 98;

/// Input channel of a vital-sign reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalChannel {
    /// Heart rate in beats per minute
    HeartRate,
    /// Blood oxygen saturation in percent
    Spo2,
}

impl VitalChannel {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalChannel::HeartRate => "heart_rate",
            VitalChannel::Spo2 => "spo2",
        }
    }
}

/// Latest known (heart rate, SpO2) pair
///
/// Always a complete pair: a partial update replaces one field and keeps the
/// other at its last known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Heart rate (bpm)
    pub heart_rate: u32,
    /// Oxygen saturation (%)
    pub spo2: u32,
    /// Time of the most recent field update
    pub observed_at: DateTime<Utc>,
}

impl Measurement {
    /// Create a measurement observed now
    pub fn new(heart_rate: u32, spo2: u32) -> Self {
        Self {
            heart_rate,
            spo2,
            observed_at: Utc::now(),
        }
    }

    /// Apply a single-channel update in place
    pub fn apply(&mut self, update: &MeasurementUpdate) {
        match update.channel {
            VitalChannel::HeartRate => self.heart_rate = update.value,
            VitalChannel::Spo2 => self.spo2 = update.value,
        }
        self.observed_at = update.observed_at;
    }

    /// Return a copy with the update applied
    pub fn with_update(mut self, update: &MeasurementUpdate) -> Self {
        self.apply(update);
        self
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Self::new(INITIAL_HEART_RATE, INITIAL_SPO2)
    }
}

/// A fresh value for one channel, as delivered by the ingest boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementUpdate {
    pub channel: VitalChannel,
    pub value: u32,
    pub observed_at: DateTime<Utc>,
}

impl MeasurementUpdate {
    /// Heart-rate update observed now
    pub fn heart_rate(value: u32) -> Self {
        Self::now(VitalChannel::HeartRate, value)
    }

    /// SpO2 update observed now
    pub fn spo2(value: u32) -> Self {
        Self::now(VitalChannel::Spo2, value)
    }

    /// Update for an arbitrary channel observed now
    pub fn now(channel: VitalChannel, value: u32) -> Self {
        Self {
            channel,
            value,
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_resting_baseline() {
        let m = Measurement::default();
        assert_eq!(m.heart_rate, 70);
        assert_eq!(m.spo2, 98);
    }

    #[test]
    fn test_partial_update_keeps_other_field() {
        let m = Measurement::new(72, 97).with_update(&MeasurementUpdate::heart_rate(110));
        assert_eq!(m.heart_rate, 110);
        assert_eq!(m.spo2, 97);

        let m = m.with_update(&MeasurementUpdate::spo2(91));
        assert_eq!(m.heart_rate, 110);
        assert_eq!(m.spo2, 91);
    }

    #[test]
    fn test_update_moves_observation_time() {
        let mut m = Measurement::new(72, 97);
        let update = MeasurementUpdate::spo2(96);
        m.apply(&update);
        assert_eq!(m.observed_at, update.observed_at);
    }
}
