//! Health Monitor - Main Entry Point

use anyhow::Context;
use api::{init_logging, install_metrics, service, AppConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialise logging")?;

    info!("=== Health Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = match install_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder unavailable: {}", e);
            None
        }
    };

    service::run(config, metrics).await
}
