//! Pipeline Status

use crate::fanout::SinkOutcome;
use inference_engine::ClassifierFailure;
use serde::Serialize;
use vitals_core::CycleRecord;

/// Coordinator state within one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    Classifying,
    Recommending,
    Persisting,
}

/// Everything known about one completed cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub record: CycleRecord,
    pub classifier_failures: Vec<ClassifierFailure>,
    pub sinks: Vec<SinkOutcome>,
    pub duration_ms: u64,
}

impl CycleReport {
    /// Outcome for a named sink
    pub fn sink(&self, name: &str) -> Option<&SinkOutcome> {
        self.sinks.iter().find(|outcome| outcome.sink == name)
    }
}

/// Read-only view published by the coordinator
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStatus {
    pub phase: CyclePhase,
    pub cycles_completed: u64,
    pub last_cycle: Option<CycleReport>,
}
