//! Shared application state

use metrics_exporter_prometheus::PrometheusHandle;
use pipeline::{MeasurementHandle, PipelineStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use vitals_core::{ConnectionState, Sink};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Published coordinator status
    pub status: watch::Receiver<PipelineStatus>,
    /// Read access to the latest measurement
    pub measurements: MeasurementHandle,
    pub sinks: Vec<Arc<dyn Sink>>,
    /// Broker connectivity as tracked by the ingest loop
    pub ingest_connected: Arc<AtomicBool>,
    pub metrics: Option<PrometheusHandle>,
    pub version: &'static str,
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        status: watch::Receiver<PipelineStatus>,
        measurements: MeasurementHandle,
        sinks: Vec<Arc<dyn Sink>>,
        ingest_connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            status,
            measurements,
            sinks,
            ingest_connected,
            metrics: None,
            version: env!("CARGO_PKG_VERSION"),
            start_time: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn ingest_connected(&self) -> bool {
        self.ingest_connected.load(Ordering::Relaxed)
    }

    /// Connection state of a named sink; unknown sinks read as down
    pub fn sink_state(&self, name: &str) -> ConnectionState {
        self.sinks
            .iter()
            .find(|sink| sink.name() == name)
            .map(|sink| sink.connection_state())
            .unwrap_or_else(|| ConnectionState::down("not registered"))
    }
}
