//! Cycle Record

use crate::measurement::Measurement;
use crate::recommendation::Recommendation;
use crate::verdict::{Verdict, VerdictSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of one classify → recommend pass, handed unchanged to every sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Unique cycle identifier (log correlation)
    pub cycle_id: Uuid,
    /// Monotonic cycle counter since process start
    pub sequence: u64,
    /// Snapshot the cycle operated on
    pub measurement: Measurement,
    pub verdict: Verdict,
    pub verdict_source: VerdictSource,
    pub recommendation: Recommendation,
    /// When the cycle produced this record
    pub processed_at: DateTime<Utc>,
}

impl CycleRecord {
    /// Create a record stamped now
    pub fn new(
        sequence: u64,
        measurement: Measurement,
        verdict: Verdict,
        verdict_source: VerdictSource,
        recommendation: Recommendation,
    ) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            sequence,
            measurement,
            verdict,
            verdict_source,
            recommendation,
            processed_at: Utc::now(),
        }
    }

    /// Processing time in ISO-8601 text form
    pub fn timestamp_iso(&self) -> String {
        self.processed_at.to_rfc3339()
    }
}
