// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! rigdaq - Multi-Sensor Test Rig Data Acquisition
//!
//! A continuous acquisition pipeline for an instrumented test rig:
//! - one concurrent poller per sensor (force bridge, triaxial
//!   accelerometer, thermocouple) on a fixed cadence
//! - a bounded hand-off queue into a single collector that owns the
//!   in-memory reading history
//! - shared, tear-free calibration applied at read time
//! - on-demand aggregation (per-sensor averages, index-aligned series,
//!   summary statistics) and export (JSON rows, tab-delimited text)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Acquisition Engine                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────┐   ┌─────────┐   ┌───────────┐               │
//! │  │ Pollers │ → │  Queue  │ → │ Collector │               │
//! │  │ (1/kind)│   │ (mpsc)  │   │  (single) │               │
//! │  └─────────┘   └─────────┘   └───────────┘               │
//! │       ↑                        ↓        ↓                │
//! │  ┌───────────┐       ┌──────────────┐ ┌────────────────┐ │
//! │  │Calibration│       │ ReadingStore │ │ Display/Chart  │ │
//! │  │ snapshots │       │ (append-only)│ │     sinks      │ │
//! │  └───────────┘       └──────────────┘ └────────────────┘ │
//! │                          ↓         ↓                     │
//! │                   ┌──────────┐ ┌──────────┐              │
//! │                   │ Analysis │ │  Export  │              │
//! │                   └──────────┘ └──────────┘              │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod acquisition;
pub mod analysis;
pub mod config;
pub mod export;
pub mod sensors;

// Re-exports for convenience
pub use acquisition::{AcquisitionEngine, LifecycleController, LifecycleState, ReadingStore};
pub use analysis::{AlignedSeries, MetricStats};
pub use config::Config;
pub use export::{ExportError, ExportFormat};
pub use sensors::{
    CalibrationSet, CalibrationStore, Metric, Reading, SampleValue, SensorKind, SensorReader,
};

/// rigdaq version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// rigdaq name
pub const NAME: &str = "rigdaq";
