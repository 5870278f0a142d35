//! Measurement Snapshot Handle

use std::sync::Arc;
use tokio::sync::watch;
use vitals_core::{Measurement, MeasurementUpdate};

/// Write side of the coordinator's measurement snapshot
///
/// Cloned into the ingest boundary. Updates replace the snapshot atomically
/// and never wait on a running cycle; rapid updates coalesce to the latest.
#[derive(Debug, Clone)]
pub struct MeasurementHandle {
    tx: Arc<watch::Sender<Measurement>>,
}

impl MeasurementHandle {
    /// Create a handle and the receiver a coordinator reads from
    pub fn new(initial: Measurement) -> (Self, watch::Receiver<Measurement>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Apply a single-channel update
    pub fn update(&self, update: MeasurementUpdate) {
        self.tx.send_modify(|measurement| measurement.apply(&update));
    }

    /// Copy of the latest known pair
    pub fn latest(&self) -> Measurement {
        *self.tx.borrow()
    }
}
