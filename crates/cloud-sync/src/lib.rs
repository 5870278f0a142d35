//! Cloud Synchronization Module
//!
//! Realtime-database sink over the REST API:
//! - one "current state" record overwritten every cycle
//! - one append-only log entry per cycle
//! - both writes attempted independently

mod document;
mod sink;

pub use document::CloudDocument;
pub use sink::{CloudConfig, RealtimeDbSink, SINK_NAME};

use thiserror::Error;

/// Cloud sync error types
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Cloud database URL not configured")]
    NotConfigured,

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Request to {path} failed: {reason}")]
    Request { path: String, reason: String },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },
}

impl CloudError {
    fn from_reqwest(path: &str, err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => CloudError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            },
            None => CloudError::Request {
                path: path.to_string(),
                reason: err.to_string(),
            },
        }
    }

    /// Whether the error means the database could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, CloudError::Request { .. })
    }
}
