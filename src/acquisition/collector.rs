// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Single consumer that drains the queue into the store and feeds the sinks

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::analysis;
use crate::sensors::Reading;

use super::sinks::{ChartSink, DisplaySink};
use super::store::ReadingStore;

/// The queue consumer task
///
/// Ticks on its own cadence, decoupled from the pollers: each tick drains
/// everything currently buffered, appends it to the store, updates the
/// display, and hands the chart sink the current aligned series - with
/// zero new items that is still a redraw.
pub struct Collector {
    handle: JoinHandle<()>,
}

impl Collector {
    pub fn spawn(
        mut queue: mpsc::Receiver<Reading>,
        store: Arc<ReadingStore>,
        display: Arc<dyn DisplaySink>,
        chart: Arc<dyn ChartSink>,
        tick_interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            info!("collector started");
            let mut ticks = interval(tick_interval);
            loop {
                ticks.tick().await;
                let drained = drain_available(&mut queue, &store, display.as_ref());
                if drained.count > 0 {
                    debug!("drained {} readings", drained.count);
                }
                let snapshot = store.snapshot();
                chart.render(&analysis::aligned_series(&snapshot));
                if drained.closed {
                    break;
                }
            }
            info!("collector stopped after {} readings", store.len());
        });
        Self { handle }
    }

    /// Wait for the final drain to complete.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

struct DrainOutcome {
    count: usize,
    closed: bool,
}

/// Non-blocking drain of everything currently buffered.
///
/// `closed` is only reported once the channel is both empty and
/// disconnected, so readings accepted before shutdown are never lost.
fn drain_available(
    queue: &mut mpsc::Receiver<Reading>,
    store: &ReadingStore,
    display: &dyn DisplaySink,
) -> DrainOutcome {
    let mut count = 0;
    loop {
        match queue.try_recv() {
            Ok(reading) => {
                forward_to_display(display, &reading);
                store.append(reading);
                count += 1;
            }
            Err(TryRecvError::Empty) => return DrainOutcome { count, closed: false },
            Err(TryRecvError::Disconnected) => return DrainOutcome { count, closed: true },
        }
    }
}

fn forward_to_display(display: &dyn DisplaySink, reading: &Reading) {
    for &metric in reading.kind.metrics() {
        if let Some(value) = reading.metric(metric) {
            display.update(reading.kind, metric, format!("{value:.3}"));
        }
    }
}
