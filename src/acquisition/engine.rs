// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Operator-facing facade over the acquisition pipeline

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use crate::analysis::{self, AlignedSeries, AverageReport, SummaryReport};
use crate::config::AcquisitionConfig;
use crate::export::{self, ExportError, ExportFormat};
use crate::sensors::{
    CalibrationError, CalibrationSet, CalibrationStore, Reading, SensorKind, SensorReader,
};

use super::collector::Collector;
use super::lifecycle::{LifecycleController, LifecycleState};
use super::poller::PollerPool;
use super::sinks::{ChartSink, DisplaySink};
use super::store::ReadingStore;

/// Builds a fresh reader per sensor for each run
pub type ReaderFactory = Box<dyn Fn() -> Result<Vec<Box<dyn SensorReader>>> + Send + Sync>;

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A generation is still running or draining; nothing was spawned.
    AlreadyRunning,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("reset is only available while acquisition is idle")]
    ResetWhileActive,
}

struct RunHandles {
    pool: PollerPool,
    collector: Collector,
}

/// Owns the pipeline: calibration, store, lifecycle, sinks, readers
///
/// Operations mirror the operator actions of the rig console: start, stop,
/// reset, calibrate, the aggregation views, and export.
pub struct AcquisitionEngine {
    config: AcquisitionConfig,
    calibration: Arc<CalibrationStore>,
    store: Arc<ReadingStore>,
    lifecycle: Arc<LifecycleController>,
    display: Arc<dyn DisplaySink>,
    chart: Arc<dyn ChartSink>,
    readers: ReaderFactory,
    handles: Mutex<Option<RunHandles>>,
}

impl AcquisitionEngine {
    pub fn new(
        config: AcquisitionConfig,
        readers: ReaderFactory,
        display: Arc<dyn DisplaySink>,
        chart: Arc<dyn ChartSink>,
    ) -> Self {
        Self {
            config,
            calibration: Arc::new(CalibrationStore::default()),
            store: Arc::new(ReadingStore::new()),
            lifecycle: Arc::new(LifecycleController::new()),
            display,
            chart,
            readers,
            handles: Mutex::new(None),
        }
    }

    /// Begin a fresh run: clear the store, spawn one poller per sensor and
    /// the collector. Idempotent - a duplicate start spawns nothing.
    ///
    /// A failing reader factory (sensor bus unavailable) is an
    /// unrecoverable startup condition and is surfaced to the caller.
    pub fn start(&self) -> Result<StartOutcome> {
        let readers = (self.readers)().context("sensor initialization failed")?;
        let token = match self.lifecycle.start() {
            Some(token) => token,
            None => {
                info!("acquisition already active; start ignored");
                return Ok(StartOutcome::AlreadyRunning);
            }
        };

        self.store.clear();
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let pool = PollerPool::spawn(
            readers,
            &token,
            self.lifecycle.clone(),
            self.calibration.clone(),
            tx,
            self.config.poll_interval(),
        );
        let collector = Collector::spawn(
            rx,
            self.store.clone(),
            self.display.clone(),
            self.chart.clone(),
            self.config.tick_interval(),
        );
        *self.handles.lock() = Some(RunHandles { pool, collector });
        info!("acquisition started (generation {})", token.generation());
        Ok(StartOutcome::Started)
    }

    /// Signal cancellation without waiting. Pollers exit within one poll
    /// interval; buffered readings are still flushed to the store.
    pub fn stop(&self) {
        self.lifecycle.stop();
    }

    /// Stop and wait until every worker and the collector have exited.
    pub async fn shutdown(&self) {
        self.lifecycle.stop();
        let handles = self.handles.lock().take();
        if let Some(handles) = handles {
            handles.pool.join().await;
            handles.collector.join().await;
        }
    }

    /// Discard the collected readings. Legal only while idle; calibration
    /// factors are left untouched.
    pub fn reset(&self) -> Result<(), EngineError> {
        if self.lifecycle.state() != LifecycleState::Idle {
            return Err(EngineError::ResetWhileActive);
        }
        self.store.clear();
        info!("reading store reset");
        Ok(())
    }

    /// Save one operator-entered scale factor.
    pub fn calibrate(&self, kind: SensorKind, factor: f64) -> Result<(), CalibrationError> {
        self.calibration.set(kind, factor)?;
        info!("saved {kind} calibration: {factor}");
        Ok(())
    }

    pub fn calibration(&self) -> CalibrationSet {
        self.calibration.snapshot()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn store_len(&self) -> usize {
        self.store.len()
    }

    /// Copy of the full history in arrival order.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.store.snapshot()
    }

    /// Per-sensor metric means (the bar-graph view).
    pub fn averages(&self) -> AverageReport {
        analysis::averages_by_sensor(&self.store.snapshot())
    }

    /// Index-aligned multi-series slices (the multi-panel view).
    pub fn aligned_series(&self) -> AlignedSeries {
        analysis::aligned_series(&self.store.snapshot())
    }

    /// Descriptive statistics per sensor and metric.
    pub fn summary(&self) -> SummaryReport {
        analysis::summary_statistics(&self.store.snapshot())
    }

    /// Serialize the collected readings to `path`.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        export::export_to_path(&self.store.snapshot(), path, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::sinks::{LogChart, LogDisplay};
    use crate::sensors::{Metric, ScriptedReader};
    use std::time::Duration;

    fn scripted_engine(values: &'static [f64]) -> AcquisitionEngine {
        let factory: ReaderFactory = Box::new(move || {
            Ok(vec![Box::new(ScriptedReader::scalars(SensorKind::Force, values))
                as Box<dyn SensorReader>])
        });
        AcquisitionEngine::new(
            AcquisitionConfig {
                poll_interval_ms: 1,
                tick_interval_ms: 1,
                queue_capacity: 16,
            },
            factory,
            Arc::new(LogDisplay),
            Arc::new(LogChart),
        )
    }

    async fn wait_for_store(engine: &AcquisitionEngine, at_least: usize) {
        for _ in 0..500 {
            if engine.store_len() >= at_least {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("store never reached {at_least} readings");
    }

    #[tokio::test]
    async fn duplicate_start_spawns_nothing() {
        let engine = scripted_engine(&[1.0, 2.0, 3.0]);
        assert_eq!(engine.start().unwrap(), StartOutcome::Started);
        assert_eq!(engine.start().unwrap(), StartOutcome::AlreadyRunning);
        engine.shutdown().await;
        assert_eq!(engine.state(), LifecycleState::Idle);
    }

    #[tokio::test]
    async fn restart_begins_a_fresh_run() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        // Each run reads a different constant, so leftovers are detectable
        let runs = Arc::new(AtomicUsize::new(0));
        let factory: ReaderFactory = {
            let runs = runs.clone();
            Box::new(move || {
                let run = runs.fetch_add(1, Ordering::SeqCst) + 1;
                let value = run as f64;
                Ok(vec![Box::new(ScriptedReader::scalars(
                    SensorKind::Force,
                    &[value, value, value, value],
                )) as Box<dyn SensorReader>])
            })
        };
        let engine = AcquisitionEngine::new(
            AcquisitionConfig {
                poll_interval_ms: 1,
                tick_interval_ms: 1,
                queue_capacity: 16,
            },
            factory,
            Arc::new(LogDisplay),
            Arc::new(LogChart),
        );

        engine.start().unwrap();
        wait_for_store(&engine, 1).await;
        engine.shutdown().await;
        assert!(engine.store_len() >= 1);

        // Second run: the store was cleared on start and holds only
        // second-run readings
        engine.start().unwrap();
        wait_for_store(&engine, 1).await;
        engine.shutdown().await;
        let snapshot = engine.snapshot();
        assert!(!snapshot.is_empty());
        assert!(snapshot
            .iter()
            .filter(|r| r.is_valid())
            .all(|r| r.metric(Metric::Force) == Some(2.0)));
    }

    #[tokio::test]
    async fn reset_requires_idle_and_keeps_calibration() {
        let engine = scripted_engine(&[1.0]);
        engine.calibrate(SensorKind::Force, 2.0).unwrap();

        engine.start().unwrap();
        assert_eq!(engine.reset(), Err(EngineError::ResetWhileActive));
        engine.shutdown().await;

        engine.reset().unwrap();
        assert_eq!(engine.store_len(), 0);
        assert_eq!(engine.calibration().force, 2.0);
    }

    #[tokio::test]
    async fn collected_readings_flow_into_aggregation() {
        let engine = scripted_engine(&[10.0, 20.0, 30.0]);
        engine.start().unwrap();
        wait_for_store(&engine, 3).await;
        engine.shutdown().await;

        let averages = engine.averages();
        let force = averages
            .get(&SensorKind::Force)
            .and_then(|m| m.as_ref())
            .expect("force data");
        // Exhausted-script attempts are invalid and excluded from the mean
        assert_eq!(force.get(&Metric::Force), Some(&20.0));
    }
}
