//! MQTT client session

use crate::config::IngestConfig;
use crate::dispatch::IngestDispatcher;
use crate::IngestError;
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Connected MQTT ingest session
pub struct MqttIngest {
    config: IngestConfig,
    client: AsyncClient,
    eventloop: EventLoop,
    connected: Arc<AtomicBool>,
}

impl MqttIngest {
    /// Connect to the broker and wait for its acknowledgement
    ///
    /// Failure here is fatal to the service.
    pub async fn connect(config: IngestConfig) -> Result<Self, IngestError> {
        info!(
            "Connecting to MQTT broker {}:{} (tls: {})",
            config.broker_host, config.broker_port, config.tls
        );
        let (client, mut eventloop) = AsyncClient::new(config.mqtt_options(), 10);

        let acknowledged = tokio::time::timeout(config.connect_timeout(), async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => return Ok(ack),
                    Ok(_) => continue,
                    Err(e) => return Err(IngestError::Connection(e.to_string())),
                }
            }
        })
        .await
        .map_err(|_| IngestError::Timeout(config.connect_timeout_secs))??;
        debug!("CONNACK: {:?}", acknowledged.code);

        let ingest = Self {
            config,
            client,
            eventloop,
            connected: Arc::new(AtomicBool::new(true)),
        };
        ingest.subscribe().await?;
        info!("Connected to MQTT broker: {}", ingest.config.broker_host);
        Ok(ingest)
    }

    /// Shared flag tracking broker connectivity
    pub fn connected_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    async fn subscribe(&self) -> Result<(), IngestError> {
        for topic in [&self.config.heart_rate_topic, &self.config.spo2_topic] {
            self.client
                .subscribe(topic.as_str(), QoS::AtLeastOnce)
                .await
                .map_err(|e| IngestError::Subscribe(e.to_string()))?;
            info!("Subscribed to {}", topic);
        }
        Ok(())
    }

    /// Drive the session until the task is dropped
    ///
    /// Reconnects are handled by the event loop; subscriptions are renewed on
    /// every acknowledgement.
    pub async fn run(mut self, dispatcher: IngestDispatcher) {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("MQTT session re-established");
                    self.connected.store(true, Ordering::Relaxed);
                    for topic in dispatcher.topics() {
                        if let Err(e) = self.client.try_subscribe(topic, QoS::AtLeastOnce) {
                            warn!("Resubscribe to {} failed: {}", topic, e);
                        }
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    dispatcher.handle_message(&publish.topic, &publish.payload);
                }
                Ok(Event::Incoming(incoming)) => {
                    debug!("MQTT incoming: {:?}", incoming);
                }
                Ok(Event::Outgoing(_)) => {}
                Err(e) => {
                    if self.connected.swap(false, Ordering::Relaxed) {
                        warn!("MQTT connection lost: {}", e);
                    } else {
                        debug!("MQTT still disconnected: {}", e);
                    }
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
            }
        }
    }
}
