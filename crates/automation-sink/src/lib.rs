//! Automation Server Sink
//!
//! Writes every cycle result to named nodes on the automation server:
//! - two Int32 vitals, four Boolean verdict flags, three String fields
//! - one independent write per node, failures collected per field
//! - fails fast while disconnected; reconnecting happens elsewhere

mod config;
mod error;
#[cfg(feature = "opcua")]
mod opcua_transport;
mod sink;
mod transport;

pub use config::{AutomationConfig, NodeMap};
pub use error::AutomationError;
#[cfg(feature = "opcua")]
pub use opcua_transport::OpcUaTransport;
pub use sink::{truncate_chars, AutomationSink, SINK_NAME};
pub use transport::{Identity, NodeTransport, NodeValue, UnavailableTransport};
