use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Prometheus text exposition
pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}
