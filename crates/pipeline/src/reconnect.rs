//! Sink Reconnection
//!
//! Runs outside the cycle path: persists never reconnect inline.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vitals_core::Sink;

/// Attempt `connect()` on every disconnected sink once
///
/// Returns the number of sinks that came back.
pub async fn reconnect_disconnected(sinks: &[Arc<dyn Sink>]) -> usize {
    let mut restored = 0;
    for sink in sinks.iter().filter(|sink| !sink.is_connected()) {
        debug!("Reconnecting {} sink", sink.name());
        match sink.connect().await {
            Ok(()) => {
                info!("{} sink reconnected", sink.name());
                restored += 1;
            }
            Err(e) => warn!("{} sink still unavailable: {}", sink.name(), e),
        }
    }
    restored
}

/// Periodically reconnect disconnected sinks until the task is dropped
pub async fn supervise_reconnects(sinks: Vec<Arc<dyn Sink>>, every: Duration) {
    info!("Sink reconnect supervisor running every {:?}", every);
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately; startup already attempted a connect.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        reconnect_disconnected(&sinks).await;
    }
}
