//! Output seams for the live display and the animated chart

use tracing::debug;

use crate::analysis::AlignedSeries;
use crate::sensors::{Metric, SensorKind};

/// Receives one formatted value per metric as readings arrive
///
/// Best effort: implementations must swallow their own failures; a broken
/// display never aborts collection.
pub trait DisplaySink: Send + Sync {
    fn update(&self, kind: SensorKind, metric: Metric, value: String);
}

/// Receives the full aligned series once per collector tick
///
/// Must tolerate an empty series.
pub trait ChartSink: Send + Sync {
    fn render(&self, series: &AlignedSeries);
}

/// Logs each value at debug level; stands in for the GUI readout
#[derive(Debug, Default)]
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn update(&self, kind: SensorKind, metric: Metric, value: String) {
        debug!("{kind} {metric}: {value}");
    }
}

/// Logs the series length once per tick; stands in for the plot window
#[derive(Debug, Default)]
pub struct LogChart;

impl ChartSink for LogChart {
    fn render(&self, series: &AlignedSeries) {
        debug!("chart tick: {} aligned samples", series.len);
    }
}
