use crate::state::AppState;
use axum::{extract::State, Json};
use vitals_core::Measurement;

/// Latest measurement snapshot
pub async fn get_latest(State(state): State<AppState>) -> Json<Measurement> {
    Json(state.measurements.latest())
}
