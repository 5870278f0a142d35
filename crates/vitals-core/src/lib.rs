//! Vital-Signs Core Types
//!
//! Data model shared by every stage of the ingest → classify → prioritize →
//! fan-out pipeline:
//! - [`Measurement`] snapshot and single-channel [`MeasurementUpdate`]s
//! - four-flag [`Verdict`] and its [`VerdictSource`]
//! - prioritized [`Recommendation`]
//! - [`CycleRecord`] handed to every [`Sink`]

mod measurement;
mod recommendation;
mod record;
mod sink;
mod verdict;

pub use measurement::{Measurement, MeasurementUpdate, VitalChannel, INITIAL_HEART_RATE, INITIAL_SPO2};
pub use recommendation::{Recommendation, SeverityLabel};
pub use record::CycleRecord;
pub use sink::{ConnectionCell, ConnectionState, FieldFailure, PersistReport, Sink, SinkError};
pub use verdict::{Condition, Verdict, VerdictSource};
