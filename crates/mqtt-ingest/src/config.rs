//! Ingest configuration

use rumqttc::{MqttOptions, Transport};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// MQTT ingest configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// TLS with the bundled root store
    pub tls: bool,
    pub client_id: String,
    pub heart_rate_topic: String,
    pub spo2_topic: String,
    pub keep_alive_secs: u64,
    /// Startup fails if the broker has not acknowledged within this time
    pub connect_timeout_secs: u64,
    /// Pause after a connection error before polling again
    pub retry_delay_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 8883,
            username: None,
            password: None,
            tls: true,
            client_id: "health_ml_backend".to_string(),
            heart_rate_topic: "sensors/hr".to_string(),
            spo2_topic: "sensors/spo2".to_string(),
            keep_alive_secs: 60,
            connect_timeout_secs: 15,
            retry_delay_secs: 5,
        }
    }
}

impl IngestConfig {
    /// Client options for this configuration
    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.broker_host, self.broker_port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs.max(5)));

        if let (Some(user), Some(password)) = (&self.username, &self.password) {
            options.set_credentials(user, password);
        }
        if self.tls {
            options.set_transport(Transport::tls_with_default_config());
        }
        options
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let config = IngestConfig::default();
        let options = config.mqtt_options();

        assert_eq!(options.client_id(), "health_ml_backend");
        assert_eq!(options.broker_address(), ("localhost".to_string(), 8883));
        assert_eq!(options.keep_alive(), Duration::from_secs(60));
        assert!(matches!(options.transport(), Transport::Tls(_)));
    }

    #[test]
    fn test_plain_tcp() {
        let config = IngestConfig {
            tls: false,
            broker_port: 1883,
            username: Some("device".to_string()),
            password: Some("pw".to_string()),
            ..IngestConfig::default()
        };
        let options = config.mqtt_options();

        assert!(matches!(options.transport(), Transport::Tcp));
        assert_eq!(options.broker_address().1, 1883);
    }
}
