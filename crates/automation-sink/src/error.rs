//! Automation Error Types

use thiserror::Error;

/// Errors raised by a node transport
#[derive(Debug, Clone, Error)]
pub enum AutomationError {
    /// No endpoint configured
    #[error("Automation endpoint not configured")]
    NotConfigured,

    /// Transport compiled out
    #[error("Automation transport unavailable: {0}")]
    Unsupported(String),

    /// Session could not be established
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Session dropped while in use
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Node id could not be parsed
    #[error("Invalid node id '{node}': {reason}")]
    InvalidNode { node: String, reason: String },

    /// Server refused the write
    #[error("Write to '{node}' rejected: {status}")]
    WriteRejected { node: String, status: String },
}

impl AutomationError {
    /// Whether the session is gone and further writes are pointless
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, AutomationError::ConnectionLost(_))
    }
}
