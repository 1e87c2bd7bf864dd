// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Simulated sensor readers for demo runs and tests

use std::collections::VecDeque;

use async_trait::async_trait;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use super::{SampleValue, SensorKind, SensorReadError, SensorReader};

/// Gaussian-noise simulator around a realistic baseline for each kind
pub struct FakeReader {
    kind: SensorKind,
    rng: StdRng,
    drift: f64,
}

impl FakeReader {
    pub fn new(kind: SensorKind, seed: u64) -> Self {
        Self {
            kind,
            rng: StdRng::seed_from_u64(seed),
            drift: 0.0,
        }
    }

    pub fn new_from_entropy(kind: SensorKind) -> Self {
        Self {
            kind,
            rng: StdRng::from_entropy(),
            drift: 0.0,
        }
    }

    /// One deterministic reader per sensor kind.
    pub fn trio(seed: u64) -> Vec<Box<dyn SensorReader>> {
        SensorKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                Box::new(FakeReader::new(kind, seed.wrapping_add(i as u64))) as Box<dyn SensorReader>
            })
            .collect()
    }

    /// One entropy-seeded reader per sensor kind, for demo runs.
    pub fn trio_from_entropy() -> Vec<Box<dyn SensorReader>> {
        SensorKind::ALL
            .iter()
            .map(|&kind| Box::new(FakeReader::new_from_entropy(kind)) as Box<dyn SensorReader>)
            .collect()
    }
}

#[async_trait]
impl SensorReader for FakeReader {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    async fn read(&mut self) -> Result<SampleValue, SensorReadError> {
        self.drift += self.rng.gen_range(-0.01..0.01);

        Ok(match self.kind {
            SensorKind::Force => {
                // Strain bridge around 1 kN with slow drift
                let noise = self.rng.sample(Normal::new(0.0, 2.5).unwrap());
                SampleValue::Scalar(1000.0 + self.drift * 50.0 + noise)
            }
            SensorKind::Acceleration => SampleValue::Triaxial {
                x: self.rng.sample(Normal::new(0.0, 0.01).unwrap()),
                y: self.rng.sample(Normal::new(0.0, 0.01).unwrap()),
                z: 1.0 + self.rng.sample(Normal::new(0.0, 0.01).unwrap()),
            },
            SensorKind::Temperature => {
                let noise = self.rng.sample(Normal::new(0.0, 0.25).unwrap());
                SampleValue::Scalar(22.0 + self.drift + noise)
            }
        })
    }
}

/// Replays a fixed script of results
///
/// Drives exact sequences through the pipeline in tests; once the script
/// is exhausted every further read fails.
pub struct ScriptedReader {
    kind: SensorKind,
    script: VecDeque<Result<SampleValue, SensorReadError>>,
}

impl ScriptedReader {
    pub fn new(kind: SensorKind, script: Vec<Result<SampleValue, SensorReadError>>) -> Self {
        Self {
            kind,
            script: script.into(),
        }
    }

    /// Script of successful scalar reads.
    pub fn scalars(kind: SensorKind, values: &[f64]) -> Self {
        Self::new(
            kind,
            values.iter().map(|&v| Ok(SampleValue::Scalar(v))).collect(),
        )
    }
}

#[async_trait]
impl SensorReader for ScriptedReader {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    async fn read(&mut self) -> Result<SampleValue, SensorReadError> {
        self.script
            .pop_front()
            .unwrap_or(Err(SensorReadError::Exhausted))
    }
}
