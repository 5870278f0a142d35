//! Data Validation and Coercion
//!
//! Turns loosely-typed readings into the non-negative integers the pipeline
//! works on:
//! - strict parsing for the ingest boundary (bad values are rejected)
//! - lenient coercion for classification (bad values become zero)
//! - payload key lookup for topic messages
//! - plausibility ranges for data-quality warnings

mod coerce;
mod error;
mod payload;
mod validator;

pub use coerce::{coerce_or_zero, parse_reading};
pub use error::ValidationError;
pub use payload::{extract_reading, payload_keys};
pub use validator::{ValidationConfig, Validator};
