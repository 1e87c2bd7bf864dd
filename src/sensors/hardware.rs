// Copyright (c) 2026 rigdaq project
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/rigdaq/rigdaq

//! Bus-backed readers for the rig hardware
//!
//! Built with `--features hardware` on the acquisition host. Each reader
//! owns its bus handle; register maps and scaling follow the device
//! datasheets.

use anyhow::{Context, Result};
use async_trait::async_trait;
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use tracing::info;

use crate::config::SensorBusConfig;

use super::{SampleValue, SensorKind, SensorReadError, SensorReader};

// ADXL345 register map
const ADXL345_ADDRESS: u16 = 0x53;
const ADXL345_POWER_CTL: u8 = 0x2d;
const ADXL345_DATA_FORMAT: u8 = 0x31;
const ADXL345_DATAX0: u8 = 0x32;
// 4 mg/LSB in full-resolution mode
const ADXL345_SCALE: f64 = 0.004;

/// ADXL345 triaxial accelerometer on the I2C bus
pub struct Adxl345Reader {
    dev: LinuxI2CDevice,
}

impl Adxl345Reader {
    pub fn open(bus: u8) -> Result<Self> {
        let mut dev = LinuxI2CDevice::new(format!("/dev/i2c-{bus}"), ADXL345_ADDRESS)
            .with_context(|| format!("opening /dev/i2c-{bus}"))?;
        // Measurement mode, full resolution, +/-16 g
        dev.smbus_write_byte_data(ADXL345_POWER_CTL, 0x08)
            .context("ADXL345 power-up")?;
        dev.smbus_write_byte_data(ADXL345_DATA_FORMAT, 0x0b)
            .context("ADXL345 data format")?;
        info!("ADXL345 initialized on i2c-{bus}");
        Ok(Self { dev })
    }
}

#[async_trait]
impl SensorReader for Adxl345Reader {
    fn kind(&self) -> SensorKind {
        SensorKind::Acceleration
    }

    async fn read(&mut self) -> Result<SampleValue, SensorReadError> {
        let raw = self
            .dev
            .smbus_read_i2c_block_data(ADXL345_DATAX0, 6)
            .map_err(|e| SensorReadError::Bus(e.to_string()))?;
        if raw.len() < 6 {
            return Err(SensorReadError::Bus("short ADXL345 data block".into()));
        }
        let axis = |lo: u8, hi: u8| f64::from(i16::from_le_bytes([lo, hi])) * ADXL345_SCALE;
        Ok(SampleValue::Triaxial {
            x: axis(raw[0], raw[1]),
            y: axis(raw[2], raw[3]),
            z: axis(raw[4], raw[5]),
        })
    }
}

/// MAX6675 thermocouple converter on SPI
///
/// 16-bit frame, 0.25 degC/LSB after dropping the three status bits; bit 2
/// set means the thermocouple input is open.
pub struct Max6675Reader {
    spi: Spidev,
}

impl Max6675Reader {
    pub fn open(device: &str) -> Result<Self> {
        let mut spi = Spidev::open(device).with_context(|| format!("opening {device}"))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(5_000)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).context("MAX6675 SPI configure")?;
        info!("MAX6675 initialized on {device}");
        Ok(Self { spi })
    }
}

#[async_trait]
impl SensorReader for Max6675Reader {
    fn kind(&self) -> SensorKind {
        SensorKind::Temperature
    }

    async fn read(&mut self) -> Result<SampleValue, SensorReadError> {
        let mut rx = [0u8; 2];
        {
            let mut transfer = SpidevTransfer::read(&mut rx);
            self.spi
                .transfer(&mut transfer)
                .map_err(|e| SensorReadError::Bus(e.to_string()))?;
        }
        let frame = u16::from_be_bytes(rx);
        if frame & 0x0004 != 0 {
            return Err(SensorReadError::OpenCircuit);
        }
        Ok(SampleValue::Scalar(f64::from(frame >> 3) * 0.25))
    }
}

/// HX711 bridge ADC clocked over SPI
///
/// MOSI drives PD_SCK with 0xAA pulse patterns while MISO samples DOUT;
/// 24 data clocks plus the gain-select clocks for channel A at gain 128.
pub struct Hx711Reader {
    spi: Spidev,
}

impl Hx711Reader {
    pub fn open(device: &str) -> Result<Self> {
        let mut spi = Spidev::open(device).with_context(|| format!("opening {device}"))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(1_000_000)
            .mode(SpiModeFlags::SPI_MODE_1)
            .build();
        spi.configure(&options).context("HX711 SPI configure")?;
        info!("HX711 initialized on {device}");
        Ok(Self { spi })
    }

    /// Each 0xAA byte clocks four conversion bits; DOUT is sampled at the
    /// even bit positions of the returned byte. The 24-bit frame is two's
    /// complement.
    fn decode(rx: &[u8; 7]) -> i32 {
        let mut value: u32 = 0;
        let mut bits = 0;
        'outer: for byte in rx {
            for shift in [6u8, 4, 2, 0] {
                if bits == 24 {
                    break 'outer;
                }
                value = (value << 1) | u32::from((byte >> shift) & 1);
                bits += 1;
            }
        }
        ((value << 8) as i32) >> 8
    }
}

#[async_trait]
impl SensorReader for Hx711Reader {
    fn kind(&self) -> SensorKind {
        SensorKind::Force
    }

    async fn read(&mut self) -> Result<SampleValue, SensorReadError> {
        // 28 clock pulses: 24 data bits + gain select for the next cycle
        let tx = [0xaa_u8; 7];
        let mut rx = [0u8; 7];
        {
            let mut transfer = SpidevTransfer::read_write(&tx, &mut rx);
            self.spi
                .transfer(&mut transfer)
                .map_err(|e| SensorReadError::Bus(e.to_string()))?;
        }
        // DOUT idles high until a conversion is ready
        if rx[0] & 0x80 != 0 {
            return Err(SensorReadError::Bus("HX711 conversion not ready".into()));
        }
        Ok(SampleValue::Scalar(f64::from(Self::decode(&rx))))
    }
}

/// Open one bus-backed reader per sensor kind.
///
/// A bus that cannot be initialized is an unrecoverable startup condition;
/// the error carries the failing device.
pub fn hardware_trio(config: &SensorBusConfig) -> Result<Vec<Box<dyn SensorReader>>> {
    Ok(vec![
        Box::new(Hx711Reader::open(&config.spi_force)?),
        Box::new(Adxl345Reader::open(config.i2c_bus)?),
        Box::new(Max6675Reader::open(&config.spi_temperature)?),
    ])
}
