// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Per-sensor scale factors shared between the operator and the pollers

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::SensorKind;

/// One scale factor per sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSet {
    pub force: f64,
    pub acceleration: f64,
    pub temperature: f64,
}

impl Default for CalibrationSet {
    fn default() -> Self {
        Self {
            force: 1.0,
            acceleration: 1.0,
            temperature: 1.0,
        }
    }
}

impl CalibrationSet {
    pub fn factor(&self, kind: SensorKind) -> f64 {
        match kind {
            SensorKind::Force => self.force,
            SensorKind::Acceleration => self.acceleration,
            SensorKind::Temperature => self.temperature,
        }
    }
}

/// Rejected operator input; the prior factor is retained
#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("invalid calibration factor {0}: must be a finite number")]
    InvalidFactor(f64),
}

/// Shared calibration state
///
/// Writes replace factors under a write lock; `snapshot` copies the whole
/// set under a read lock, so a poller never observes a torn update spanning
/// two factors.
#[derive(Debug, Default)]
pub struct CalibrationStore {
    inner: RwLock<CalibrationSet>,
}

impl CalibrationStore {
    pub fn new(initial: CalibrationSet) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Atomic copy of the full set.
    pub fn snapshot(&self) -> CalibrationSet {
        *self.inner.read()
    }

    /// Replace one factor. Invalid input leaves the prior value in place.
    pub fn set(&self, kind: SensorKind, factor: f64) -> Result<(), CalibrationError> {
        if !factor.is_finite() {
            return Err(CalibrationError::InvalidFactor(factor));
        }
        let mut set = self.inner.write();
        match kind {
            SensorKind::Force => set.force = factor,
            SensorKind::Acceleration => set.acceleration = factor,
            SensorKind::Temperature => set.temperature = factor,
        }
        debug!("{kind} calibration set to {factor}");
        Ok(())
    }

    /// Replace the whole set at once. Validates every factor before any of
    /// them is applied.
    pub fn set_all(&self, set: CalibrationSet) -> Result<(), CalibrationError> {
        for factor in [set.force, set.acceleration, set.temperature] {
            if !factor.is_finite() {
                return Err(CalibrationError::InvalidFactor(factor));
            }
        }
        *self.inner.write() = set;
        Ok(())
    }
}
