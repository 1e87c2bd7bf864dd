//! Sensor layer - readings, calibration, simulated and bus-backed readers

mod calibration;
mod fake;
mod traits;

#[cfg(feature = "hardware")]
mod hardware;

pub use calibration::{CalibrationError, CalibrationSet, CalibrationStore};
pub use fake::{FakeReader, ScriptedReader};
pub use traits::{Metric, Reading, SampleValue, SensorKind, SensorReadError, SensorReader};

#[cfg(feature = "hardware")]
pub use hardware::{hardware_trio, Adxl345Reader, Hx711Reader, Max6675Reader};
