//! MQTT Ingest
//!
//! Subscribes to the heart-rate and SpO2 topics and turns every accepted
//! payload into a single-channel measurement update. Malformed payloads are
//! logged and dropped; the previous value stays in the snapshot.

mod client;
mod config;
mod dispatch;

pub use client::MqttIngest;
pub use config::IngestConfig;
pub use dispatch::{IngestDispatcher, ReadingOutcome};

use thiserror::Error;

/// Ingest error types
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("No CONNACK from broker within {0}s")]
    Timeout(u64),

    #[error("Subscribe failed: {0}")]
    Subscribe(String),
}
