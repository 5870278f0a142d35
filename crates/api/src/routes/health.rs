//! Health endpoint

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use vitals_core::ConnectionState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" when every boundary is connected, "degraded" otherwise
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub ingest: ConnectionState,
    pub automation: ConnectionState,
    pub cloud: ConnectionState,
}

impl ComponentStatus {
    fn all_connected(&self) -> bool {
        self.ingest.connected && self.automation.connected && self.cloud.connected
    }
}

/// Health check handler
pub async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    let ingest = if state.ingest_connected() {
        ConnectionState::up()
    } else {
        ConnectionState::down("broker unreachable")
    };
    let components = ComponentStatus {
        ingest,
        automation: state.sink_state(automation_sink::SINK_NAME),
        cloud: state.sink_state(cloud_sync::SINK_NAME),
    };

    Json(HealthResponse {
        status: if components.all_connected() {
            "healthy"
        } else {
            "degraded"
        },
        service: "health-monitor",
        version: state.version,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components,
    })
}
