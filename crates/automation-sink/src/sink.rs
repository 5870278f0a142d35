//! Automation Sink Implementation

use crate::config::AutomationConfig;
use crate::error::AutomationError;
use crate::transport::{Identity, NodeTransport, NodeValue};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vitals_core::{
    ConnectionCell, ConnectionState, CycleRecord, PersistReport, Sink, SinkError,
};

/// Name reported in logs, metrics and status
pub const SINK_NAME: &str = "automation";

/// Cut `text` to at most `max` characters
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Sink writing cycle results to automation server nodes
pub struct AutomationSink {
    config: AutomationConfig,
    transport: Arc<dyn NodeTransport>,
    state: ConnectionCell,
}

impl AutomationSink {
    /// Create a new automation sink; starts disconnected
    pub fn new(config: AutomationConfig, transport: Arc<dyn NodeTransport>) -> Self {
        Self {
            config,
            transport,
            state: ConnectionCell::new(),
        }
    }

    /// Node writes for one record, in write order
    fn writes(&self, record: &CycleRecord) -> Vec<(&'static str, &str, NodeValue)> {
        let nodes = &self.config.nodes;
        let verdict = &record.verdict;
        let advisory = truncate_chars(
            &record.recommendation.advisory,
            self.config.advisory_max_len,
        );

        vec![
            ("heart_rate", nodes.heart_rate.as_str(), NodeValue::Int32(saturate(record.measurement.heart_rate))),
            ("spo2", nodes.spo2.as_str(), NodeValue::Int32(saturate(record.measurement.spo2))),
            ("anomaly", nodes.anomaly.as_str(), NodeValue::Boolean(verdict.anomaly)),
            ("arrhythmia", nodes.arrhythmia.as_str(), NodeValue::Boolean(verdict.arrhythmia)),
            ("bradycardia", nodes.bradycardia.as_str(), NodeValue::Boolean(verdict.bradycardia)),
            ("tachycardia", nodes.tachycardia.as_str(), NodeValue::Boolean(verdict.tachycardia)),
            (
                "status",
                nodes.status.as_str(),
                NodeValue::String(record.recommendation.severity.as_str().to_string()),
            ),
            ("recommendation", nodes.recommendation.as_str(), NodeValue::String(advisory.to_string())),
            ("timestamp", nodes.timestamp.as_str(), NodeValue::String(record.timestamp_iso())),
        ]
    }
}

/// Marks the sink down if a persist is dropped before its writes finish
///
/// A write already handed to the transport may still land later; the next
/// persist must not race it, so the session is treated as gone until the
/// reconnect path replaces it.
struct InFlightWrites<'a> {
    state: &'a ConnectionCell,
    finished: bool,
}

impl Drop for InFlightWrites<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Automation persist abandoned mid-write, dropping session");
            self.state.mark_down("persist abandoned before all writes completed");
        }
    }
}

fn saturate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[async_trait]
impl Sink for AutomationSink {
    fn name(&self) -> &'static str {
        SINK_NAME
    }

    async fn connect(&self) -> Result<(), SinkError> {
        if self.state.is_connected() {
            return Ok(());
        }
        if !self.config.is_configured() {
            self.state.mark_down(AutomationError::NotConfigured.to_string());
            return Err(SinkError::NotConfigured {
                sink: SINK_NAME,
                reason: "endpoint is empty".to_string(),
            });
        }

        let identity = Identity::from_credentials(
            self.config.username.as_deref(),
            self.config.password.as_deref(),
        );
        debug!("Connecting to {} as {:?}", self.config.endpoint, identity);

        match self.transport.connect(&self.config.endpoint, &identity).await {
            Ok(()) => {
                self.state.mark_connected();
                info!("Connected to automation server: {}", self.config.endpoint);
                Ok(())
            }
            Err(AutomationError::Unsupported(reason)) => {
                self.state.mark_down(reason.clone());
                Err(SinkError::NotConfigured {
                    sink: SINK_NAME,
                    reason,
                })
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

        let mut in_flight = InFlightWrites {
            state: &self.state,
            finished: false,
        };
        let mut report = PersistReport::new(SINK_NAME);
        let mut lost: Option<String> = None;

        for (field, node, value) in self.writes(record) {
            if let Some(reason) = &lost {
                report.record_err(field, format!("skipped: {}", reason));
                continue;
            }

            debug!("Writing {} to {}", value, node);
            match self.transport.write(node, value).await {
                Ok(()) => report.record_ok(field),
                Err(e) if e.is_connection_lost() => {
                    warn!("Automation session lost while writing {}: {}", field, e);
                    self.state.mark_down(e.to_string());
                    report.record_err(field, e.to_string());
                    lost = Some(e.to_string());
                }
                Err(e) => {
                    warn!("Failed to write {} ({}): {}", field, node, e);
                    self.state.note_error(e.to_string());
                    report.record_err(field, e.to_string());
                }
            }
        }

        in_flight.finished = true;

        if lost.is_some() {
            self.transport.disconnect().await;
        } else if report.is_complete() {
            self.state.note_ok();
        }
        report.into_result()
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use vitals_core::{
        Measurement, Recommendation, SeverityLabel, Verdict, VerdictSource,
    };

    #[derive(Default)]
    struct FakeTransport {
        connects: AtomicUsize,
        writes: Mutex<Vec<(String, NodeValue)>>,
        rejected: Mutex<HashSet<String>>,
        drop_on: Option<String>,
        stall_on: Option<String>,
    }

    #[async_trait]
    impl NodeTransport for FakeTransport {
        async fn connect(&self, _endpoint: &str, _identity: &Identity) -> Result<(), AutomationError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn write(&self, node: &str, value: NodeValue) -> Result<(), AutomationError> {
            if self.drop_on.as_deref() == Some(node) {
                return Err(AutomationError::ConnectionLost("socket closed".to_string()));
            }
            if self.stall_on.as_deref() == Some(node) {
                std::future::pending::<()>().await;
            }
            if self.rejected.lock().unwrap().contains(node) {
                return Err(AutomationError::WriteRejected {
                    node: node.to_string(),
                    status: "BadTypeMismatch".to_string(),
                });
            }
            self.writes.lock().unwrap().push((node.to_string(), value));
            Ok(())
        }

        async fn disconnect(&self) {}
    }

    fn configured() -> AutomationConfig {
        AutomationConfig {
            endpoint: "opc.tcp://plc.local:4840".to_string(),
            username: Some("operator".to_string()),
            password: Some("pw".to_string()),
            ..AutomationConfig::default()
        }
    }

    fn record(advisory: &str) -> CycleRecord {
        let verdict = Verdict {
            tachycardia: true,
            ..Verdict::CLEAR
        };
        CycleRecord::new(
            1,
            Measurement::new(110, 93),
            verdict,
            VerdictSource::Fallback,
            Recommendation {
                severity: SeverityLabel::TachycardiaDetected,
                advisory: advisory.to_string(),
            },
        )
    }

    async fn connected(transport: Arc<FakeTransport>) -> AutomationSink {
        let sink = AutomationSink::new(configured(), transport);
        sink.connect().await.unwrap();
        sink
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 2000), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_not_configured() {
        let transport = Arc::new(FakeTransport::default());
        let sink = AutomationSink::new(AutomationConfig::default(), transport.clone());

        let err = sink.connect().await.unwrap_err();

        assert!(matches!(err, SinkError::NotConfigured { .. }));
        assert!(!sink.is_connected());
        assert_eq!(transport.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persist_while_disconnected_fails_fast() {
        let transport = Arc::new(FakeTransport::default());
        let sink = AutomationSink::new(configured(), transport.clone());

        let err = sink.persist(&record("rest")).await.unwrap_err();

        assert!(matches!(err, SinkError::NotConnected { .. }));
        assert_eq!(transport.connects.load(Ordering::SeqCst), 0);
        assert!(transport.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let transport = Arc::new(FakeTransport::default());
        let sink = connected(transport.clone()).await;
        sink.connect().await.unwrap();
        assert_eq!(transport.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_writes_nine_typed_values() {
        let transport = Arc::new(FakeTransport::default());
        let sink = connected(transport.clone()).await;

        let report = sink.persist(&record("Rest and re-measure")).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 9);
        let writes = transport.writes.lock().unwrap();
        assert_eq!(writes[0], ("ns=3;i=1020".to_string(), NodeValue::Int32(110)));
        assert_eq!(writes[1], ("ns=3;i=1021".to_string(), NodeValue::Int32(93)));
        assert_eq!(writes[5], ("ns=3;i=1026".to_string(), NodeValue::Boolean(true)));
        assert_eq!(
            writes[6],
            (
                "ns=3;s=1027".to_string(),
                NodeValue::String("Tachycardia Detected".to_string())
            )
        );
        assert_eq!(writes[8].0, "ns=3;i=1022");
    }

    #[tokio::test]
    async fn test_rejected_node_does_not_stop_other_fields() {
        let transport = Arc::new(FakeTransport {
            rejected: Mutex::new(HashSet::from(["ns=3;i=1021".to_string()])),
            ..FakeTransport::default()
        });
        let sink = connected(transport.clone()).await;

        let report = sink.persist(&record("advice")).await.unwrap();

        assert_eq!(report.written.len(), 8);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].field, "spo2");
        assert!(sink.is_connected());
        assert!(sink.connection_state().last_error.is_some());
    }

    #[tokio::test]
    async fn test_clean_persist_clears_noted_error() {
        let transport = Arc::new(FakeTransport {
            rejected: Mutex::new(HashSet::from(["ns=3;i=1021".to_string()])),
            ..FakeTransport::default()
        });
        let sink = connected(transport.clone()).await;
        sink.persist(&record("advice")).await.unwrap();
        assert!(sink.connection_state().last_error.is_some());

        transport.rejected.lock().unwrap().clear();
        let report = sink.persist(&record("advice")).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(sink.connection_state(), ConnectionState::up());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_persist_marks_sink_down() {
        let transport = Arc::new(FakeTransport {
            stall_on: Some("ns=3;i=1024".to_string()),
            ..FakeTransport::default()
        });
        let sink = connected(transport.clone()).await;

        let abandoned =
            tokio::time::timeout(Duration::from_secs(5), sink.persist(&record("advice"))).await;
        assert!(abandoned.is_err());
        assert!(!sink.is_connected());

        let err = sink.persist(&record("advice")).await.unwrap_err();
        assert!(matches!(err, SinkError::NotConnected { .. }));
        // Only the writes issued before the stall reached the transport
        assert_eq!(transport.writes.lock().unwrap().len(), 2);

        sink.connect().await.unwrap();
        assert_eq!(transport.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lost_session_marks_sink_down() {
        let transport = Arc::new(FakeTransport {
            drop_on: Some("ns=3;i=1024".to_string()),
            ..FakeTransport::default()
        });
        let sink = connected(transport.clone()).await;

        let report = sink.persist(&record("advice")).await.unwrap();
        assert_eq!(report.written, vec!["heart_rate", "spo2"]);
        assert_eq!(report.failed.len(), 7);
        assert!(!sink.is_connected());

        let err = sink.persist(&record("advice")).await.unwrap_err();
        assert!(matches!(err, SinkError::NotConnected { .. }));
        assert_eq!(transport.writes.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_advisory_truncated_to_limit() {
        let transport = Arc::new(FakeTransport::default());
        let sink = connected(transport.clone()).await;

        sink.persist(&record(&"é".repeat(2500))).await.unwrap();

        let writes = transport.writes.lock().unwrap();
        match &writes[7].1 {
            NodeValue::String(text) => assert_eq!(text.chars().count(), 2000),
            other => panic!("unexpected value {:?}", other),
        }
    }
}
