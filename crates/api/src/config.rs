//! Service configuration
//!
//! Layered with the `config` crate: optional TOML file, then
//! `HEALTH_MONITOR__SECTION__KEY` environment variables.

use crate::rate_limit::RateLimitConfig;
use alerting::RecommendationConfig;
use automation_sink::AutomationConfig;
use cloud_sync::CloudConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use data_validator::ValidationConfig;
use fallback::Thresholds;
use inference_engine::ModelConfig;
use mqtt_ingest::IngestConfig;
use pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "HEALTH_MONITOR_CONFIG";
/// Config file used when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "health-monitor.toml";
const ENV_PREFIX: &str = "HEALTH_MONITOR";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Full service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub mqtt: IngestConfig,
    /// Plausibility ranges for ingest warnings
    pub validation: ValidationConfig,
    pub automation: AutomationConfig,
    pub cloud: CloudConfig,
    pub models: ModelConfig,
    pub pipeline: PipelineConfig,
    pub fallback: Thresholds,
    pub recommendation: RecommendationConfig,
}

impl AppConfig {
    /// Load from the configured file (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (optional) and the environment
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Parse a TOML document; environment overrides still apply
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.mqtt.broker_port, 8883);
        assert_eq!(config.mqtt.client_id, "health_ml_backend");
        assert!(config.mqtt.tls);
        assert_eq!(config.automation.nodes.heart_rate, "ns=3;i=1020");
        assert_eq!(config.automation.advisory_max_len, 2000);
        assert_eq!(config.cloud.current_path, "realtime_data");
        assert_eq!(config.pipeline.initial_heart_rate, 70);
        assert_eq!(config.pipeline.initial_spo2, 98);
        assert_eq!(config.pipeline.sink_timeout_ms, 5000);
        assert_eq!(config.fallback.anomaly_hr_low, 40);
        assert_eq!(config.recommendation.low_spo2_threshold, 95);
        assert_eq!(config.validation, ValidationConfig::default());
    }

    #[test]
    fn test_validation_ranges_from_file() {
        let config = AppConfig::from_toml(
            r#"
            [validation]
            heart_rate_range = [30, 220]
            "#,
        )
        .unwrap();

        assert_eq!(config.validation.heart_rate_range, (30, 220));
        assert_eq!(config.validation.spo2_range, (0, 100));
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [mqtt]
            broker_host = "broker.hivemq.cloud"
            heart_rate_topic = "ward/3/hr"

            [automation]
            endpoint = "opc.tcp://plc.local:4840"

            [automation.nodes]
            status = "ns=2;s=Status"

            [pipeline]
            sink_timeout_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.mqtt.broker_host, "broker.hivemq.cloud");
        assert_eq!(config.mqtt.heart_rate_topic, "ward/3/hr");
        assert_eq!(config.mqtt.spo2_topic, "sensors/spo2");
        assert!(config.automation.is_configured());
        assert_eq!(config.automation.nodes.status, "ns=2;s=Status");
        assert_eq!(config.automation.nodes.spo2, "ns=3;i=1021");
        assert_eq!(config.pipeline.sink_timeout_ms, 1500);
        assert_eq!(config.pipeline.initial_spo2, 98);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = AppConfig::load_from("/nonexistent/health-monitor").unwrap();
        assert_eq!(config.cloud.log_path, "logs");
    }
}
