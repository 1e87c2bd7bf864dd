// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::export::ExportFormat;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log level
    pub log_level: String,

    /// Use simulated sensors instead of the rig buses
    pub demo_mode: bool,

    /// Acquisition timing and buffering
    pub acquisition: AcquisitionConfig,

    /// Hardware bus addressing
    pub sensor_bus: SensorBusConfig,

    /// Export defaults
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "rigdaq".to_string(),
            log_level: "info".to_string(),
            demo_mode: true,
            acquisition: AcquisitionConfig::default(),
            sensor_bus: SensorBusConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("rigdaq"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Acquisition timing and buffering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Milliseconds between polls of each sensor
    pub poll_interval_ms: u64,

    /// Milliseconds between collector drain/redraw ticks
    pub tick_interval_ms: u64,

    /// Capacity of the poller-to-collector hand-off queue
    pub queue_capacity: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            tick_interval_ms: 1_000,
            queue_capacity: 64,
        }
    }
}

impl AcquisitionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Hardware bus addressing (used with the `hardware` feature)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorBusConfig {
    /// I2C bus number for the accelerometer
    pub i2c_bus: u8,

    /// SPI device for the thermocouple converter
    pub spi_temperature: String,

    /// SPI device for the strain bridge ADC
    pub spi_force: String,
}

impl Default for SensorBusConfig {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            spi_temperature: "/dev/spidev0.0".to_string(),
            spi_force: "/dev/spidev0.1".to_string(),
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default export format
    pub format: ExportFormat,

    /// Default export path
    pub path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Tsv,
            path: PathBuf::from("./data/readings.tsv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.acquisition.poll_interval_ms, 1_000);
        assert_eq!(parsed.acquisition.queue_capacity, 64);
        assert!(parsed.demo_mode);
    }

    #[test]
    fn intervals_convert_to_durations() {
        let acquisition = AcquisitionConfig::default();
        assert_eq!(acquisition.poll_interval(), Duration::from_secs(1));
        assert_eq!(acquisition.tick_interval(), Duration::from_secs(1));
    }
}
