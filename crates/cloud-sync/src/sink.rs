//! Realtime-database sink

use crate::document::CloudDocument;
use crate::CloudError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use vitals_core::{ConnectionCell, ConnectionState, CycleRecord, PersistReport, Sink, SinkError};

/// Name reported in logs, metrics and status
pub const SINK_NAME: &str = "cloud";

/// Cloud sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Database root, e.g. `https://project-default-rtdb.firebaseio.com`
    pub database_url: String,
    /// Passed as the `auth` query parameter when set
    pub auth_token: Option<String>,
    /// Record overwritten every cycle
    pub current_path: String,
    /// Collection receiving one entry per cycle
    pub log_path: String,
    pub request_timeout_ms: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            auth_token: None,
            current_path: "realtime_data".to_string(),
            log_path: "logs".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl CloudConfig {
    pub fn is_configured(&self) -> bool {
        !self.database_url.trim().is_empty()
    }
}

/// Cloud realtime-database sink
pub struct RealtimeDbSink {
    config: CloudConfig,
    client: reqwest::Client,
    state: ConnectionCell,
}

impl RealtimeDbSink {
    /// Create new cloud sink; starts disconnected
    pub fn new(config: CloudConfig) -> Result<Self, CloudError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| CloudError::Client(e.to_string()))?;

        Ok(Self {
            config,
            client,
            state: ConnectionCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}.json",
            self.config.database_url.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.config.auth_token {
            Some(token) => builder.query(&[("auth", token.as_str())]),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder, path: &str) -> Result<(), CloudError> {
        builder
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map(|_| ())
            .map_err(|e| CloudError::from_reqwest(path, e))
    }

    /// Overwrite the current-state record
    pub async fn write_current(&self, document: &CloudDocument) -> Result<(), CloudError> {
        let path = &self.config.current_path;
        self.send(self.request(reqwest::Method::PUT, path).json(document), path)
            .await
    }

    /// Append one log entry
    pub async fn append_log(&self, document: &CloudDocument) -> Result<(), CloudError> {
        let path = &self.config.log_path;
        self.send(self.request(reqwest::Method::POST, path).json(document), path)
            .await
    }

    fn collect(&self, report: &mut PersistReport, field: &'static str, result: Result<(), CloudError>) {
        match result {
            Ok(()) => report.record_ok(field),
            Err(e) => {
                warn!("Cloud {} write failed: {}", field, e);
                if e.is_unreachable() {
                    self.state.mark_down(e.to_string());
                } else {
                    self.state.note_error(e.to_string());
                }
                report.record_err(field, e.to_string());
            }
        }
    }
}

#[async_trait]
impl Sink for RealtimeDbSink {
    fn name(&self) -> &'static str {
        SINK_NAME
    }

    async fn connect(&self) -> Result<(), SinkError> {
        if !self.config.is_configured() {
            self.state.mark_down(CloudError::NotConfigured.to_string());
            return Err(SinkError::NotConfigured {
                sink: SINK_NAME,
                reason: "database_url is empty".to_string(),
            });
        }

        let path = &self.config.current_path;
        let request = self
            .request(reqwest::Method::GET, path)
            .query(&[("shallow", "true")]);

        match self.send(request, path).await {
            Ok(()) => {
                self.state.mark_connected();
                info!("Connected to cloud database: {}", self.config.database_url);
                Ok(())
            }
            Err(e) => {
                self.state.mark_down(e.to_string());
                Err(SinkError::Connection {
                    sink: SINK_NAME,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn persist(&self, record: &CycleRecord) -> Result<PersistReport, SinkError> {
        if !self.state.is_connected() {
            return Err(SinkError::NotConnected { sink: SINK_NAME });
        }

        let document = CloudDocument::from(record);
        let (current, log) = tokio::join!(self.write_current(&document), self.append_log(&document));
        debug!("Cloud writes for cycle {} complete", record.sequence);

        let mut report = PersistReport::new(SINK_NAME);
        self.collect(&mut report, "current_state", current);
        self.collect(&mut report, "log_entry", log);
        if report.is_complete() {
            self.state.note_ok();
        }
        report.into_result()
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.snapshot()
    }
}
