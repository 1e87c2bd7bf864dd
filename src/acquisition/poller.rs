// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! One polling worker per sensor

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::sensors::{CalibrationStore, Reading, SensorReader};

use super::lifecycle::{LifecycleController, RunToken};

/// One generation of pollers plus the supervisor that joins them
pub struct PollerPool {
    supervisor: JoinHandle<()>,
}

impl PollerPool {
    /// Spawn one worker per reader. Workers run until the token's
    /// cancellation signal fires; the supervisor joins them all and then
    /// confirms Idle back to the controller.
    pub fn spawn(
        readers: Vec<Box<dyn SensorReader>>,
        token: &RunToken,
        lifecycle: Arc<LifecycleController>,
        calibration: Arc<CalibrationStore>,
        queue: mpsc::Sender<Reading>,
        poll_interval: Duration,
    ) -> Self {
        let mut workers = Vec::with_capacity(readers.len());
        for reader in readers {
            workers.push(tokio::spawn(poll_loop(
                reader,
                token.subscribe(),
                calibration.clone(),
                queue.clone(),
                poll_interval,
            )));
        }
        // Only workers hold senders now; the collector sees the channel
        // close once the last worker exits.
        drop(queue);

        let generation = token.generation();
        let supervisor = tokio::spawn(async move {
            for worker in workers {
                if let Err(e) = worker.await {
                    warn!("poller task failed: {e}");
                }
            }
            lifecycle.confirm_idle(generation);
            debug!("poller generation {generation} fully stopped");
        });

        Self { supervisor }
    }

    /// Wait until every worker of this generation has exited.
    pub async fn join(self) {
        let _ = self.supervisor.await;
    }
}

async fn poll_loop(
    mut reader: Box<dyn SensorReader>,
    mut shutdown: broadcast::Receiver<()>,
    calibration: Arc<CalibrationStore>,
    queue: mpsc::Sender<Reading>,
    poll_interval: Duration,
) {
    let kind = reader.kind();
    info!("poller started for {kind}");
    let mut ticks = interval(poll_interval);

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = ticks.tick() => {
                // One whole-set snapshot per iteration: a triaxial sample
                // is never scaled by a half-updated calibration
                let factor = calibration.snapshot().factor(kind);
                let reading = match reader.read().await {
                    Ok(value) => Reading::valid(kind, value.scaled(factor)),
                    Err(e) => {
                        warn!("{kind} read failed: {e}");
                        Reading::invalid(kind)
                    }
                };
                // Exactly one reading enters the queue per iteration,
                // failed reads included
                if queue.send(reading).await.is_err() {
                    break;
                }
            }
        }
    }
    info!("poller stopped for {kind}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{
        CalibrationSet, Metric, SampleValue, ScriptedReader, SensorKind, SensorReadError,
    };
    use crate::acquisition::lifecycle::LifecycleState;

    fn scripted(kind: SensorKind, values: &[f64]) -> Vec<Box<dyn SensorReader>> {
        vec![Box::new(ScriptedReader::scalars(kind, values)) as Box<dyn SensorReader>]
    }

    #[tokio::test]
    async fn readings_arrive_in_read_order_and_failures_are_recorded() {
        let lifecycle = Arc::new(LifecycleController::new());
        let calibration = Arc::new(CalibrationStore::default());
        let (tx, mut rx) = mpsc::channel(16);

        let token = lifecycle.start().expect("start");
        let pool = PollerPool::spawn(
            scripted(SensorKind::Force, &[10.0, 20.0, 30.0]),
            &token,
            lifecycle.clone(),
            calibration,
            tx,
            Duration::from_millis(1),
        );

        let mut received = Vec::new();
        for _ in 0..5 {
            received.push(rx.recv().await.expect("reading"));
        }
        lifecycle.stop();
        pool.join().await;

        let values: Vec<Option<f64>> = received.iter().map(|r| r.metric(Metric::Force)).collect();
        assert_eq!(values[..3], [Some(10.0), Some(20.0), Some(30.0)]);
        // Script exhausted: attempts keep producing readings, now invalid
        assert_eq!(values[3..], [None, None]);
        assert!(received[3..].iter().all(|r| !r.is_valid()));
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
    }

    #[tokio::test]
    async fn calibration_snapshot_is_applied_per_reading() {
        let lifecycle = Arc::new(LifecycleController::new());
        let calibration = Arc::new(CalibrationStore::default());
        calibration
            .set_all(CalibrationSet {
                force: 2.0,
                acceleration: 1.0,
                temperature: 1.0,
            })
            .unwrap();
        let (tx, mut rx) = mpsc::channel(16);

        let token = lifecycle.start().expect("start");
        let pool = PollerPool::spawn(
            scripted(SensorKind::Force, &[10.0]),
            &token,
            lifecycle.clone(),
            calibration,
            tx,
            Duration::from_millis(1),
        );

        let first = rx.recv().await.expect("reading");
        assert_eq!(first.metric(Metric::Force), Some(20.0));

        lifecycle.stop();
        pool.join().await;
    }

    #[tokio::test]
    async fn mixed_results_yield_one_reading_per_attempt() {
        let lifecycle = Arc::new(LifecycleController::new());
        let calibration = Arc::new(CalibrationStore::default());
        let (tx, mut rx) = mpsc::channel(16);

        let script = vec![
            Ok(SampleValue::Scalar(1.0)),
            Err(SensorReadError::Bus("transient".into())),
            Ok(SampleValue::Scalar(3.0)),
        ];
        let readers =
            vec![Box::new(ScriptedReader::new(SensorKind::Temperature, script))
                as Box<dyn SensorReader>];

        let token = lifecycle.start().expect("start");
        let pool = PollerPool::spawn(
            readers,
            &token,
            lifecycle.clone(),
            calibration,
            tx,
            Duration::from_millis(1),
        );

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(rx.recv().await.expect("reading"));
        }
        lifecycle.stop();
        pool.join().await;

        assert_eq!(received.len(), 3);
        assert!(received[0].is_valid());
        assert!(!received[1].is_valid());
        assert!(received[2].is_valid());
        assert_eq!(received[2].metric(Metric::Temperature), Some(3.0));
    }
}
