//! Sink Fan-out

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use vitals_core::{CycleRecord, FieldFailure, Sink};

/// Result of one sink's persist attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PersistStatus {
    /// Every field written
    Written { fields: usize },
    /// Some fields rejected, the rest written
    Partial {
        written: usize,
        failed: Vec<FieldFailure>,
    },
    /// Nothing written (disconnected, rejected, transport error)
    Failed { error: String },
    /// Persist exceeded the configured bound and was abandoned
    TimedOut { timeout_ms: u64 },
}

impl PersistStatus {
    /// Whether at least one field reached the sink
    pub fn is_success(&self) -> bool {
        matches!(self, PersistStatus::Written { .. } | PersistStatus::Partial { .. })
    }

    fn metric_label(&self) -> &'static str {
        match self {
            PersistStatus::Written { .. } => "written",
            PersistStatus::Partial { .. } => "partial",
            PersistStatus::Failed { .. } => "failed",
            PersistStatus::TimedOut { .. } => "timed_out",
        }
    }
}

/// Named persist outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkOutcome {
    pub sink: &'static str,
    #[serde(flatten)]
    pub status: PersistStatus,
}

/// Persist one record to every sink concurrently
///
/// Each sink runs in its own task bounded by `timeout`; a failing, panicking
/// or hung sink cannot prevent or delay the others beyond that bound.
pub async fn fan_out(
    sinks: &[Arc<dyn Sink>],
    record: Arc<CycleRecord>,
    timeout: Duration,
) -> Vec<SinkOutcome> {
    let tasks: Vec<_> = sinks
        .iter()
        .map(|sink| {
            let sink = Arc::clone(sink);
            let record = Arc::clone(&record);
            let name = sink.name();
            let task = tokio::spawn(async move { persist_one(sink.as_ref(), &record, timeout).await });
            (name, task)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (name, task) in tasks {
        let status = match task.await {
            Ok(status) => status,
            Err(e) => {
                warn!("{} persist task aborted: {}", name, e);
                PersistStatus::Failed {
                    error: format!("persist task aborted: {}", e),
                }
            }
        };
        metrics::counter!(
            "vitals_sink_persist_total",
            "sink" => name,
            "outcome" => status.metric_label()
        )
        .increment(1);
        outcomes.push(SinkOutcome { sink: name, status });
    }
    outcomes
}

async fn persist_one(sink: &dyn Sink, record: &CycleRecord, timeout: Duration) -> PersistStatus {
    let name = sink.name();
    match tokio::time::timeout(timeout, sink.persist(record)).await {
        Ok(Ok(report)) if report.is_complete() => {
            debug!("{}: wrote {} fields for cycle {}", name, report.written.len(), record.sequence);
            PersistStatus::Written {
                fields: report.written.len(),
            }
        }
        Ok(Ok(report)) => {
            for failure in &report.failed {
                warn!("{}: field '{}' not written: {}", name, failure.field, failure.reason);
            }
            PersistStatus::Partial {
                written: report.written.len(),
                failed: report.failed,
            }
        }
        Ok(Err(e)) => {
            warn!("{}: persist failed for cycle {}: {}", name, record.sequence, e);
            PersistStatus::Failed {
                error: e.to_string(),
            }
        }
        Err(_) => {
            let timeout_ms = timeout.as_millis() as u64;
            warn!("{}: persist timed out after {}ms", name, timeout_ms);
            PersistStatus::TimedOut { timeout_ms }
        }
    }
}
