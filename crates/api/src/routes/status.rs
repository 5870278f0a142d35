//! Full status snapshot

use crate::state::AppState;
use axum::{extract::State, Json};
use pipeline::{CyclePhase, CycleReport};
use serde::Serialize;
use vitals_core::{ConnectionState, Measurement};

/// Connectivity of one sink
#[derive(Debug, Serialize)]
pub struct SinkStatus {
    pub name: &'static str,
    #[serde(flatten)]
    pub state: ConnectionState,
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: CyclePhase,
    pub cycles_completed: u64,
    pub ingest_connected: bool,
    pub sinks: Vec<SinkStatus>,
    pub latest_measurement: Measurement,
    /// Verdict, recommendation and per-sink outcomes of the last cycle
    pub last_cycle: Option<CycleReport>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (phase, cycles_completed, last_cycle) = {
        let status = state.status.borrow();
        (status.phase, status.cycles_completed, status.last_cycle.clone())
    };

    Json(StatusResponse {
        phase,
        cycles_completed,
        ingest_connected: state.ingest_connected(),
        sinks: state
            .sinks
            .iter()
            .map(|sink| SinkStatus {
                name: sink.name(),
                state: sink.connection_state(),
            })
            .collect(),
        latest_measurement: state.measurements.latest(),
        last_cycle,
    })
}
