// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! rigdaq - Multi-Sensor Test Rig Data Acquisition
//!
//! Headless acquisition console: polls the rig sensors on a fixed cadence,
//! keeps the live history in memory, and reports summary statistics and an
//! optional export on shutdown.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rigdaq::acquisition::{AcquisitionEngine, LogChart, LogDisplay, ReaderFactory};
use rigdaq::analysis;
use rigdaq::config::Config;
use rigdaq::export::ExportFormat;
use rigdaq::sensors::FakeReader;
use rigdaq::VERSION;

/// rigdaq - Multi-Sensor Test Rig Data Acquisition
#[derive(Parser, Debug)]
#[command(name = "rigdaq")]
#[command(version = VERSION)]
#[command(about = "Continuous multi-sensor test rig acquisition")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with simulated sensors
    #[arg(long)]
    demo: bool,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration: Option<u64>,

    /// Export the collected readings to this path on shutdown
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export format (json or tsv)
    #[arg(long, default_value = "tsv")]
    format: ExportFormat,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("rigdaq v{} - Multi-Sensor Test Rig Data Acquisition", VERSION);

    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    if args.demo {
        config.demo_mode = true;
    }
    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, args.duration, args.export, args.format))
}

fn reader_factory(config: &Config) -> ReaderFactory {
    #[cfg(feature = "hardware")]
    {
        if !config.demo_mode {
            let bus = config.sensor_bus.clone();
            return Box::new(move || rigdaq::sensors::hardware_trio(&bus));
        }
    }
    if !config.demo_mode {
        warn!("built without the hardware feature; using simulated sensors");
    }
    Box::new(|| Ok(FakeReader::trio_from_entropy()))
}

async fn run(
    config: Config,
    duration: Option<u64>,
    export_path: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    let engine = Arc::new(AcquisitionEngine::new(
        config.acquisition.clone(),
        reader_factory(&config),
        Arc::new(LogDisplay),
        Arc::new(LogChart),
    ));

    engine.start().context("failed to start acquisition")?;
    info!("Acquisition running - press Ctrl+C to stop");

    match duration {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => {
            tokio::signal::ctrl_c().await?;
        }
    }

    info!("Shutting down...");
    engine.shutdown().await;
    info!("Collected {} readings", engine.store_len());

    let summary = analysis::render_summary(&engine.summary());
    info!("Data summary:\n{summary}");

    if let Some(path) = export_path {
        engine
            .export(&path, format)
            .with_context(|| format!("exporting to {}", path.display()))?;
    }

    Ok(())
}
