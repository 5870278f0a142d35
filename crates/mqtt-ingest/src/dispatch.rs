//! Topic dispatch

use crate::config::IngestConfig;
use data_validator::{extract_reading, ValidationConfig, ValidationError, Validator};
use pipeline::MeasurementHandle;
use tracing::{debug, warn};
use vitals_core::{MeasurementUpdate, VitalChannel};

/// What happened to one incoming message
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingOutcome {
    Accepted { channel: VitalChannel, value: u32 },
    Rejected { channel: VitalChannel, error: ValidationError },
    UnknownTopic,
}

/// Routes topic payloads into measurement updates
#[derive(Debug, Clone)]
pub struct IngestDispatcher {
    heart_rate_topic: String,
    spo2_topic: String,
    validator: Validator,
    handle: MeasurementHandle,
}

impl IngestDispatcher {
    pub fn new(config: &IngestConfig, handle: MeasurementHandle) -> Self {
        Self {
            heart_rate_topic: config.heart_rate_topic.clone(),
            spo2_topic: config.spo2_topic.clone(),
            validator: Validator::default(),
            handle,
        }
    }

    /// Use configured plausibility ranges instead of the defaults
    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.validator = Validator::new(config);
        self
    }

    /// Topics to subscribe to
    pub fn topics(&self) -> [&str; 2] {
        [&self.heart_rate_topic, &self.spo2_topic]
    }

    pub fn channel_for(&self, topic: &str) -> Option<VitalChannel> {
        if topic == self.heart_rate_topic {
            Some(VitalChannel::HeartRate)
        } else if topic == self.spo2_topic {
            Some(VitalChannel::Spo2)
        } else {
            None
        }
    }

    /// Decode one message and apply it to the snapshot
    pub fn handle_message(&self, topic: &str, payload: &[u8]) -> ReadingOutcome {
        let Some(channel) = self.channel_for(topic) else {
            debug!("Ignoring message on unrelated topic {}", topic);
            return ReadingOutcome::UnknownTopic;
        };

        match extract_reading(channel, payload) {
            Ok(value) => {
                if let Err(e) = self.validator.validate(channel, value) {
                    warn!("Implausible {} reading accepted: {}", channel.as_str(), e);
                }
                debug!("{} <- {}", channel.as_str(), value);
                self.handle.update(MeasurementUpdate::now(channel, value));
                ReadingOutcome::Accepted { channel, value }
            }
            Err(error) => {
                warn!(
                    "Dropping malformed {} payload {:?}: {}",
                    channel.as_str(),
                    String::from_utf8_lossy(payload),
                    error
                );
                metrics::counter!("vitals_ingest_rejected_total", "channel" => channel.as_str())
                    .increment(1);
                ReadingOutcome::Rejected { channel, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitals_core::Measurement;

    fn dispatcher() -> IngestDispatcher {
        let (handle, _rx) = MeasurementHandle::new(Measurement::default());
        IngestDispatcher::new(&IngestConfig::default(), handle)
    }

    #[test]
    fn test_topics_route_to_channels() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.channel_for("sensors/hr"), Some(VitalChannel::HeartRate));
        assert_eq!(dispatcher.channel_for("sensors/spo2"), Some(VitalChannel::Spo2));
        assert_eq!(dispatcher.channel_for("sensors/temp"), None);
        assert_eq!(dispatcher.topics(), ["sensors/hr", "sensors/spo2"]);
    }

    #[test]
    fn test_accepted_reading_updates_only_its_channel() {
        let dispatcher = dispatcher();

        let outcome = dispatcher.handle_message("sensors/hr", br#"{"value": 88.9}"#);

        assert_eq!(
            outcome,
            ReadingOutcome::Accepted {
                channel: VitalChannel::HeartRate,
                value: 88
            }
        );
        let latest = dispatcher.handle.latest();
        assert_eq!((latest.heart_rate, latest.spo2), (88, 98));
    }

    #[test]
    fn test_alias_keys_accepted() {
        let dispatcher = dispatcher();
        dispatcher.handle_message("sensors/spo2", br#"{"SpO2": "96"}"#);
        assert_eq!(dispatcher.handle.latest().spo2, 96);
    }

    #[test]
    fn test_malformed_payload_keeps_previous_value() {
        let dispatcher = dispatcher();
        dispatcher.handle_message("sensors/hr", b"75");

        let outcome = dispatcher.handle_message("sensors/hr", br#"{"value": "abc"}"#);

        assert!(matches!(outcome, ReadingOutcome::Rejected { .. }));
        assert_eq!(dispatcher.handle.latest().heart_rate, 75);
    }

    #[test]
    fn test_configured_ranges_warn_but_keep_reading() {
        let ranges = ValidationConfig {
            heart_rate_range: (30, 220),
            spo2_range: (50, 100),
        };
        let dispatcher = dispatcher().with_validation(ranges.clone());
        assert_eq!(dispatcher.validator.config(), &ranges);

        let outcome = dispatcher.handle_message("sensors/hr", b"250");

        assert_eq!(
            outcome,
            ReadingOutcome::Accepted {
                channel: VitalChannel::HeartRate,
                value: 250
            }
        );
        assert_eq!(dispatcher.handle.latest().heart_rate, 250);
    }

    #[test]
    fn test_unknown_topic_ignored() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.handle_message("sensors/temp", b"37"),
            ReadingOutcome::UnknownTopic
        );
        let latest = dispatcher.handle.latest();
        assert_eq!((latest.heart_rate, latest.spo2), (70, 98));
    }
}
