//! Vital-Signs Pipeline Coordinator
//!
//! Owns the latest measurement snapshot and drives one
//! classify → recommend → persist cycle at a time:
//! - updates are coalesced to the latest value, never queued
//! - every sink is attempted independently with a bounded persist time
//! - a read-only status view is published after each phase change

mod coordinator;
mod fanout;
mod reconnect;
mod snapshot;
mod status;

pub use coordinator::{Coordinator, PipelineConfig};
pub use fanout::{fan_out, PersistStatus, SinkOutcome};
pub use reconnect::{reconnect_disconnected, supervise_reconnects};
pub use snapshot::MeasurementHandle;
pub use status::{CyclePhase, CycleReport, PipelineStatus};
