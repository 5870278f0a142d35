//! Coordinator Implementation

use crate::fanout::fan_out;
use crate::snapshot::MeasurementHandle;
use crate::status::{CyclePhase, CycleReport, PipelineStatus};
use alerting::RecommendationEngine;
use inference_engine::ClassifierEnsemble;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info};
use vitals_core::{CycleRecord, Measurement, Sink, INITIAL_HEART_RATE, INITIAL_SPO2};

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Heart rate assumed until the first reading (bpm)
    pub initial_heart_rate: u32,
    /// SpO2 assumed until the first reading (%)
    pub initial_spo2: u32,
    /// Upper bound for a single sink's persist (ms)
    pub sink_timeout_ms: u64,
    /// Interval between reconnect attempts for disconnected sinks (seconds)
    pub reconnect_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            initial_heart_rate: INITIAL_HEART_RATE,
            initial_spo2: INITIAL_SPO2,
            sink_timeout_ms: 5000,
            reconnect_interval_secs: 30,
        }
    }
}

impl PipelineConfig {
    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs.max(1))
    }
}

/// Single-flight cycle coordinator
///
/// Runs at most one cycle at a time. Updates that land while a cycle is in
/// flight mark the snapshot as changed; the next cycle reads whatever the
/// latest pair is at that moment.
pub struct Coordinator {
    config: PipelineConfig,
    ensemble: Arc<ClassifierEnsemble>,
    recommender: RecommendationEngine,
    sinks: Vec<Arc<dyn Sink>>,
    measurements: watch::Receiver<Measurement>,
    status: watch::Sender<PipelineStatus>,
    sequence: u64,
}

impl Coordinator {
    /// Create a coordinator and the handle the ingest boundary writes through
    pub fn new(
        config: PipelineConfig,
        ensemble: Arc<ClassifierEnsemble>,
        recommender: RecommendationEngine,
        sinks: Vec<Arc<dyn Sink>>,
    ) -> (Self, MeasurementHandle) {
        let initial = Measurement::new(config.initial_heart_rate, config.initial_spo2);
        let (handle, measurements) = MeasurementHandle::new(initial);
        let (status, _) = watch::channel(PipelineStatus::default());

        info!(
            "Creating coordinator: {} classifiers, sinks {:?}, persist timeout {}ms",
            ensemble.loaded_count(),
            sinks.iter().map(|s| s.name()).collect::<Vec<_>>(),
            config.sink_timeout_ms
        );

        let coordinator = Self {
            config,
            ensemble,
            recommender,
            sinks,
            measurements,
            status,
            sequence: 0,
        };
        (coordinator, handle)
    }

    /// Subscribe to the published status
    pub fn status(&self) -> watch::Receiver<PipelineStatus> {
        self.status.subscribe()
    }

    /// Sinks this coordinator fans out to
    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    /// Run cycles until every [`MeasurementHandle`] is dropped
    pub async fn run(mut self) {
        info!("Coordinator waiting for measurements");

        while self.measurements.changed().await.is_ok() {
            let snapshot = *self.measurements.borrow_and_update();
            self.run_cycle(snapshot).await;
        }

        info!("Measurement source closed, coordinator stopped");
    }

    /// Execute one classify → recommend → persist cycle
    pub async fn run_cycle(&mut self, measurement: Measurement) -> CycleReport {
        let started = Instant::now();
        self.sequence += 1;
        let (heart_rate, spo2) = (measurement.heart_rate, measurement.spo2);

        self.set_phase(CyclePhase::Classifying);
        let decision = self.ensemble.classify(heart_rate, spo2);

        self.set_phase(CyclePhase::Recommending);
        let recommendation = self.recommender.recommend(&decision.verdict, heart_rate, spo2);

        info!(
            cycle = self.sequence,
            "HR={} SpO2={} -> {} (verdict {:?} from {})",
            heart_rate,
            spo2,
            recommendation.severity,
            decision.verdict,
            decision.source.as_str()
        );

        self.set_phase(CyclePhase::Persisting);
        let record = Arc::new(CycleRecord::new(
            self.sequence,
            measurement,
            decision.verdict,
            decision.source,
            recommendation,
        ));
        let sinks = fan_out(&self.sinks, Arc::clone(&record), self.config.sink_timeout()).await;

        let elapsed = started.elapsed();
        let report = CycleReport {
            record: record.as_ref().clone(),
            classifier_failures: decision.failures,
            sinks,
            duration_ms: elapsed.as_millis() as u64,
        };

        metrics::counter!("vitals_cycles_total").increment(1);
        metrics::histogram!("vitals_cycle_duration_seconds").record(elapsed.as_secs_f64());
        debug!("Cycle {} finished in {:?}", self.sequence, elapsed);

        let published = report.clone();
        self.status.send_modify(|status| {
            status.phase = CyclePhase::Idle;
            status.cycles_completed += 1;
            status.last_cycle = Some(published);
        });

        report
    }

    fn set_phase(&self, phase: CyclePhase) {
        self.status.send_modify(|status| status.phase = phase);
    }
}
