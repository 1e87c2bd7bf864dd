//! Read-side aggregation over a snapshot of the reading store
//!
//! Pure functions: every operation takes a `&[Reading]` snapshot and never
//! touches shared state. Invalid readings are excluded from all numbers;
//! a sensor with no valid readings is reported as `None`, never as a NaN
//! or a division by zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::sensors::{Metric, Reading, SensorKind};

/// Per-sensor metric means; `None` marks a sensor with no valid readings
pub type AverageReport = BTreeMap<SensorKind, Option<BTreeMap<Metric, f64>>>;

/// Per-sensor, per-metric descriptive statistics
pub type SummaryReport = BTreeMap<SensorKind, BTreeMap<Metric, Option<MetricStats>>>;

/// Population statistics for one metric over its valid readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// max - min
    pub range: f64,
}

/// Index-aligned per-sensor series
///
/// Every sensor's sequence is truncated to the shortest one before zipping
/// by index. Alignment is by sample index, not timestamp: sensors with
/// different drop rates shift relative to each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    pub len: usize,
    pub sensors: BTreeMap<SensorKind, SensorSeries>,
}

impl AlignedSeries {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One sensor's slice of an [`AlignedSeries`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub channels: BTreeMap<Metric, Vec<f64>>,
}

fn metric_values(readings: &[Reading], metric: Metric) -> Vec<f64> {
    readings.iter().filter_map(|r| r.metric(metric)).collect()
}

/// Arithmetic mean of each metric per sensor (the bar-graph view).
pub fn averages_by_sensor(readings: &[Reading]) -> AverageReport {
    SensorKind::ALL
        .iter()
        .map(|&kind| {
            let mut means = BTreeMap::new();
            for &metric in kind.metrics() {
                let values = metric_values(readings, metric);
                if !values.is_empty() {
                    means.insert(metric, values.iter().sum::<f64>() / values.len() as f64);
                }
            }
            (kind, if means.is_empty() { None } else { Some(means) })
        })
        .collect()
}

/// Truncate every sensor's valid readings to the minimum common length and
/// zip them by index (the multi-panel view).
pub fn aligned_series(readings: &[Reading]) -> AlignedSeries {
    let mut per_kind: BTreeMap<SensorKind, Vec<&Reading>> = SensorKind::ALL
        .iter()
        .map(|&kind| (kind, Vec::new()))
        .collect();
    for reading in readings.iter().filter(|r| r.is_valid()) {
        per_kind.entry(reading.kind).or_default().push(reading);
    }

    let len = per_kind.values().map(Vec::len).min().unwrap_or(0);

    let mut sensors = BTreeMap::new();
    for (kind, list) in per_kind {
        let list = &list[..len];
        let timestamps = list.iter().map(|r| r.timestamp).collect();
        let mut channels = BTreeMap::new();
        for &metric in kind.metrics() {
            channels.insert(
                metric,
                list.iter()
                    .map(|r| r.metric(metric).unwrap_or(f64::NAN))
                    .collect(),
            );
        }
        sensors.insert(kind, SensorSeries { timestamps, channels });
    }
    AlignedSeries { len, sensors }
}

/// Descriptive statistics per sensor and metric.
pub fn summary_statistics(readings: &[Reading]) -> SummaryReport {
    SensorKind::ALL
        .iter()
        .map(|&kind| {
            let per_metric = kind
                .metrics()
                .iter()
                .map(|&metric| (metric, metric_stats(&metric_values(readings, metric))))
                .collect();
            (kind, per_metric)
        })
        .collect()
}

fn metric_stats(values: &[f64]) -> Option<MetricStats> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    // Population variance, matching the summary view of the rig console
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(MetricStats {
        count,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
        range: max - min,
    })
}

/// Render a summary report as the operator-facing text block.
pub fn render_summary(report: &SummaryReport) -> String {
    let mut out = String::new();
    for (kind, metrics) in report {
        out.push_str(&format!("{kind}:\n"));
        for (metric, stats) in metrics {
            match stats {
                Some(s) => out.push_str(&format!(
                    "  {metric}: count={}, mean={:.2}, std={:.2}, min={:.2}, max={:.2}\n",
                    s.count, s.mean, s.std_dev, s.min, s.max
                )),
                None => out.push_str(&format!("  {metric}: no data\n")),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SampleValue;

    fn force(v: f64) -> Reading {
        Reading::valid(SensorKind::Force, SampleValue::Scalar(v))
    }

    fn accel(x: f64, y: f64, z: f64) -> Reading {
        Reading::valid(SensorKind::Acceleration, SampleValue::Triaxial { x, y, z })
    }

    fn temp(v: f64) -> Reading {
        Reading::valid(SensorKind::Temperature, SampleValue::Scalar(v))
    }

    #[test]
    fn averages_compute_the_mean_per_metric() {
        let readings = vec![force(10.0), force(20.0), force(30.0)];
        let report = averages_by_sensor(&readings);
        let means = report[&SensorKind::Force].as_ref().expect("force data");
        assert_eq!(means[&Metric::Force], 20.0);
    }

    #[test]
    fn sensors_without_valid_readings_report_no_data() {
        let readings = vec![force(10.0), Reading::invalid(SensorKind::Temperature)];
        let report = averages_by_sensor(&readings);
        assert!(report[&SensorKind::Force].is_some());
        assert!(report[&SensorKind::Temperature].is_none());
        assert!(report[&SensorKind::Acceleration].is_none());
    }

    #[test]
    fn invalid_readings_are_excluded_from_the_mean() {
        let readings = vec![force(10.0), Reading::invalid(SensorKind::Force), force(30.0)];
        let report = averages_by_sensor(&readings);
        let means = report[&SensorKind::Force].as_ref().expect("force data");
        assert_eq!(means[&Metric::Force], 20.0);
    }

    #[test]
    fn aligned_series_truncates_to_the_shortest_sensor() {
        let mut readings = Vec::new();
        for i in 0..5 {
            readings.push(force(i as f64));
        }
        for i in 0..3 {
            readings.push(accel(i as f64, 0.0, 1.0));
        }
        for i in 0..4 {
            readings.push(temp(20.0 + i as f64));
        }

        let series = aligned_series(&readings);
        assert_eq!(series.len, 3);
        for sensor in series.sensors.values() {
            assert_eq!(sensor.timestamps.len(), 3);
            for channel in sensor.channels.values() {
                assert_eq!(channel.len(), 3);
            }
        }
        // Truncation keeps the head of each sequence
        assert_eq!(
            series.sensors[&SensorKind::Force].channels[&Metric::Force],
            vec![0.0, 1.0, 2.0]
        );
    }

    #[test]
    fn aligned_series_is_empty_when_any_sensor_is_silent() {
        let readings = vec![force(1.0), force(2.0)];
        let series = aligned_series(&readings);
        assert_eq!(series.len, 0);
        assert!(series.is_empty());
    }

    #[test]
    fn summary_reports_population_statistics() {
        let readings = vec![temp(1.0), temp(2.0), temp(3.0), temp(4.0)];
        let report = summary_statistics(&readings);
        let stats = report[&SensorKind::Temperature][&Metric::Temperature].expect("temp stats");
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std_dev - 1.25_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.range, 3.0);
    }

    #[test]
    fn summary_marks_missing_sensors_as_no_data() {
        let report = summary_statistics(&[force(5.0)]);
        assert!(report[&SensorKind::Force][&Metric::Force].is_some());
        assert!(report[&SensorKind::Temperature][&Metric::Temperature].is_none());
        let text = render_summary(&report);
        assert!(text.contains("force: count=1"));
        assert!(text.contains("no data"));
    }
}
