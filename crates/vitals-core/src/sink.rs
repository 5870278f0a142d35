//! Sink Seam
//!
//! Every external store the pipeline fans out to implements [`Sink`].
//! Connection state is tracked per sink and never shared.

use crate::record::CycleRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Errors reported by a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{sink} sink is not connected")]
    NotConnected { sink: &'static str },

    #[error("{sink} sink is not configured: {reason}")]
    NotConfigured { sink: &'static str, reason: String },

    #[error("{sink} connection failed: {reason}")]
    Connection { sink: &'static str, reason: String },

    #[error("{sink} rejected all {attempted} writes")]
    AllWritesFailed {
        sink: &'static str,
        attempted: usize,
        failures: Vec<FieldFailure>,
    },

    #[error("{sink} persist timed out after {timeout_ms}ms")]
    Timeout { sink: &'static str, timeout_ms: u64 },
}

/// Connectivity of one sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub connected: bool,
    pub last_error: Option<String>,
}

impl ConnectionState {
    /// Connected, no outstanding error
    pub fn up() -> Self {
        Self {
            connected: true,
            last_error: None,
        }
    }

    /// Disconnected with a reason
    pub fn down(reason: impl Into<String>) -> Self {
        Self {
            connected: false,
            last_error: Some(reason.into()),
        }
    }
}

/// Interior-mutable connection state owned by a single sink
#[derive(Debug, Default)]
pub struct ConnectionCell {
    state: Mutex<ConnectionState>,
}

impl ConnectionCell {
    /// Create a cell in the initial (never connected) state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_connected(&self) {
        self.replace(ConnectionState::up());
    }

    /// Mark the sink as disconnected
    pub fn mark_down(&self, reason: impl Into<String>) {
        self.replace(ConnectionState::down(reason));
    }

    /// Record a non-fatal error while staying connected
    pub fn note_error(&self, reason: impl Into<String>) {
        let mut state = self.lock();
        state.last_error = Some(reason.into());
    }

    /// Clear a previously noted error after a fully successful write
    pub fn note_ok(&self) {
        let mut state = self.lock();
        if state.connected {
            state.last_error = None;
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ConnectionState {
        self.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn replace(&self, next: ConnectionState) {
        *self.lock() = next;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConnectionState> {
        // State is plain data; a poisoned lock still holds a usable value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One rejected field write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: &'static str,
    pub reason: String,
}

/// Per-field outcome of a best-effort persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub sink: &'static str,
    pub written: Vec<&'static str>,
    pub failed: Vec<FieldFailure>,
}

impl PersistReport {
    /// Empty report for a sink
    pub fn new(sink: &'static str) -> Self {
        Self {
            sink,
            written: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record_ok(&mut self, field: &'static str) {
        self.written.push(field);
    }

    pub fn record_err(&mut self, field: &'static str, reason: impl Into<String>) {
        self.failed.push(FieldFailure {
            field,
            reason: reason.into(),
        });
    }

    /// Number of field writes attempted
    pub fn attempted(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// Whether every attempted field was written
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Convert a report with zero successful writes into an error
    pub fn into_result(self) -> Result<PersistReport, SinkError> {
        if self.written.is_empty() && !self.failed.is_empty() {
            Err(SinkError::AllWritesFailed {
                sink: self.sink,
                attempted: self.attempted(),
                failures: self.failed,
            })
        } else {
            Ok(self)
        }
    }
}

/// External store receiving cycle results
///
/// `persist` on a disconnected sink must return [`SinkError::NotConnected`]
/// immediately; reconnecting is the caller's concern via [`Sink::connect`].
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short stable name used in logs, metrics and status
    fn name(&self) -> &'static str;

    /// Establish the connection; idempotent and safe to retry
    async fn connect(&self) -> Result<(), SinkError>;

    /// Write one cycle result, field by field
    async fn persist(&self, record: &CycleRecord) -> Result<PersistReport, SinkError>;

    /// Current connectivity
    fn connection_state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.connection_state().connected
    }
}
