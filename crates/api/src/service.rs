//! Service wiring
//!
//! Builds the pipeline from configuration and runs it until shutdown.

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{create_router, serve};
use alerting::RecommendationEngine;
use anyhow::Context;
use automation_sink::{AutomationSink, NodeTransport};
use cloud_sync::RealtimeDbSink;
use fallback::FallbackEngine;
use inference_engine::{load_slots, ClassifierEnsemble};
use metrics_exporter_prometheus::PrometheusHandle;
use mqtt_ingest::{IngestDispatcher, MqttIngest};
use pipeline::{supervise_reconnects, Coordinator};
use std::sync::Arc;
use tracing::{error, info, warn};
use vitals_core::Sink;

#[cfg(feature = "opcua")]
fn automation_transport() -> Arc<dyn NodeTransport> {
    Arc::new(automation_sink::OpcUaTransport::new())
}

#[cfg(not(feature = "opcua"))]
fn automation_transport() -> Arc<dyn NodeTransport> {
    warn!("Built without OPC UA support; automation sink stays disconnected");
    Arc::new(automation_sink::UnavailableTransport)
}

/// Construct both sinks (disconnected)
pub fn build_sinks(config: &AppConfig) -> anyhow::Result<Vec<Arc<dyn Sink>>> {
    let automation: Arc<dyn Sink> = Arc::new(AutomationSink::new(
        config.automation.clone(),
        automation_transport(),
    ));
    let cloud: Arc<dyn Sink> = Arc::new(
        RealtimeDbSink::new(config.cloud.clone()).context("failed to build cloud HTTP client")?,
    );
    Ok(vec![automation, cloud])
}

/// First connection attempt for every sink; failures are not fatal
pub async fn connect_sinks(sinks: &[Arc<dyn Sink>]) {
    for sink in sinks {
        match sink.connect().await {
            Ok(()) => info!("{} sink connected", sink.name()),
            Err(e) => warn!("{} sink unavailable at startup: {}", sink.name(), e),
        }
    }
}

/// Run the service until a shutdown signal arrives
pub async fn run(config: AppConfig, metrics: Option<PrometheusHandle>) -> anyhow::Result<()> {
    let ensemble = Arc::new(ClassifierEnsemble::new(
        load_slots(&config.models),
        FallbackEngine::new(config.fallback.clone()),
    ));
    if ensemble.loaded_count() == 0 {
        warn!("No classifiers loaded; every verdict comes from the fallback rules");
    } else {
        info!("Loaded classifiers: {:?}", ensemble.loaded());
    }

    let sinks = build_sinks(&config)?;
    connect_sinks(&sinks).await;

    let (coordinator, measurements) = Coordinator::new(
        config.pipeline.clone(),
        ensemble,
        RecommendationEngine::new(config.recommendation.clone()),
        sinks.clone(),
    );
    let status = coordinator.status();

    let ingest = match MqttIngest::connect(config.mqtt.clone()).await {
        Ok(ingest) => ingest,
        Err(e) => {
            error!("Cannot establish MQTT ingest: {}", e);
            return Err(e).context("MQTT ingest unavailable at startup");
        }
    };
    let ingest_connected = ingest.connected_flag();
    let dispatcher = IngestDispatcher::new(&config.mqtt, measurements.clone())
        .with_validation(config.validation.clone());

    let coordinator_task = tokio::spawn(coordinator.run());
    let ingest_task = tokio::spawn(ingest.run(dispatcher));
    let reconnect_task = tokio::spawn(supervise_reconnects(
        sinks.clone(),
        config.pipeline.reconnect_interval(),
    ));

    let mut state = AppState::new(status, measurements, sinks, ingest_connected);
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }

    serve(
        create_router(state),
        &config.server.bind_addr,
        &config.server.rate_limit,
        shutdown_signal(),
    )
    .await
    .with_context(|| format!("API server on {} failed", config.server.bind_addr))?;

    info!("Server stopped, shutting down pipeline");
    ingest_task.abort();
    reconnect_task.abort();
    // Coordinator stops once the last measurement handle is gone
    let _ = ingest_task.await;
    if tokio::time::timeout(config.pipeline.sink_timeout(), coordinator_task)
        .await
        .is_err()
    {
        warn!("Coordinator did not finish its last cycle in time");
    }

    info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
