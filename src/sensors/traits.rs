// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Sensor capability trait and common reading types

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sensor kinds sampled by the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    /// HX711 strain bridge
    Force,
    /// ADXL345 triaxial MEMS accelerometer
    Acceleration,
    /// MAX6675 thermocouple converter
    Temperature,
}

impl SensorKind {
    /// Every kind the rig polls, in canonical order.
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Force,
        SensorKind::Acceleration,
        SensorKind::Temperature,
    ];

    /// Stable lowercase label used in logs and export rows.
    pub const fn label(self) -> &'static str {
        match self {
            SensorKind::Force => "force",
            SensorKind::Acceleration => "acceleration",
            SensorKind::Temperature => "temperature",
        }
    }

    /// The metrics a reading of this kind carries.
    pub const fn metrics(self) -> &'static [Metric] {
        match self {
            SensorKind::Force => &[Metric::Force],
            SensorKind::Acceleration => &[Metric::AccelX, Metric::AccelY, Metric::AccelZ],
            SensorKind::Temperature => &[Metric::Temperature],
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One numeric channel of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    AccelX,
    AccelY,
    AccelZ,
    Temperature,
    Force,
}

impl Metric {
    /// Stable lowercase label used in logs and export rows.
    pub const fn label(self) -> &'static str {
        match self {
            Metric::AccelX => "accel_x",
            Metric::AccelY => "accel_y",
            Metric::AccelZ => "accel_z",
            Metric::Temperature => "temperature",
            Metric::Force => "force",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One sampled value, scalar or triaxial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SampleValue {
    Scalar(f64),
    Triaxial { x: f64, y: f64, z: f64 },
}

impl SampleValue {
    /// Scale every channel by one calibration factor.
    pub fn scaled(self, factor: f64) -> SampleValue {
        match self {
            SampleValue::Scalar(v) => SampleValue::Scalar(v * factor),
            SampleValue::Triaxial { x, y, z } => SampleValue::Triaxial {
                x: x * factor,
                y: y * factor,
                z: z * factor,
            },
        }
    }
}

/// A single timestamped, sensor-tagged observation
///
/// `value` is `None` when the underlying read failed; the reading is still
/// recorded so consumers can tell a stalled sensor from a clean one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub kind: SensorKind,
    pub timestamp: DateTime<Utc>,
    pub value: Option<SampleValue>,
}

impl Reading {
    pub fn valid(kind: SensorKind, value: SampleValue) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            value: Some(value),
        }
    }

    pub fn invalid(kind: SensorKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            value: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// The value of one metric, if this reading carries it.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        let value = self.value?;
        match (self.kind, metric, value) {
            (SensorKind::Acceleration, Metric::AccelX, SampleValue::Triaxial { x, .. }) => Some(x),
            (SensorKind::Acceleration, Metric::AccelY, SampleValue::Triaxial { y, .. }) => Some(y),
            (SensorKind::Acceleration, Metric::AccelZ, SampleValue::Triaxial { z, .. }) => Some(z),
            (SensorKind::Temperature, Metric::Temperature, SampleValue::Scalar(v)) => Some(v),
            (SensorKind::Force, Metric::Force, SampleValue::Scalar(v)) => Some(v),
            _ => None,
        }
    }
}

/// Failure of a single read attempt
///
/// Recovered per-iteration by the poller as an invalid [`Reading`]; never
/// fatal to the worker.
#[derive(Debug, Error)]
pub enum SensorReadError {
    #[error("sensor bus error: {0}")]
    Bus(String),
    #[error("thermocouple input open")]
    OpenCircuit,
    #[error("scripted reader exhausted")]
    Exhausted,
}

/// Capability seam over one physical (or simulated) sensor
///
/// Retry and backoff are the reader's own concern; the poller only sees a
/// value or a failure.
#[async_trait]
pub trait SensorReader: Send {
    /// Which sensor this reader samples.
    fn kind(&self) -> SensorKind;

    /// Read one raw sample. May block on bus I/O.
    async fn read(&mut self) -> Result<SampleValue, SensorReadError>;
}
