//! Health Monitor API Server
//!
//! Read-only HTTP status surface for the vital-signs pipeline, plus the
//! configuration, logging and wiring used by the `health-monitor` binary.

use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;
pub mod rate_limit;
pub mod routes;
pub mod service;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use rate_limit::RateLimitConfig;
pub use state::AppState;
pub use telemetry::{init_logging, install_metrics};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::get_health))
        .route("/api/v1/vitals/latest", get(routes::vitals::get_latest))
        .route("/api/v1/status", get(routes::status::get_status))
        .route("/metrics", get(routes::metrics::get_metrics))
        .with_state(state)
}

/// Serve the router with per-IP rate limiting until `shutdown` resolves
pub async fn serve<F>(
    router: Router,
    addr: &str,
    rate_limit: &RateLimitConfig,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = match rate_limit::create_governor_config(rate_limit) {
        Some(config) => {
            rate_limit::spawn_limiter_cleanup(&config);
            router.layer(GovernorLayer { config })
        }
        None => {
            warn!("Rate limit quota is zero; serving without rate limiting");
            router
        }
    };
    let app = router.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting API server on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
