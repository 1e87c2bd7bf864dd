//! Export of the reading store to structured or delimited text

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::sensors::{Reading, SampleValue, SensorKind};

/// Supported export representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Structured table: one JSON object per reading
    Json,
    /// Tab-delimited text: header row plus one line per reading
    Tsv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Tsv => "tsv",
        }
    }
}

/// Unknown format name on the command line
#[derive(Debug, Error)]
#[error("unknown export format {0:?} (expected \"json\" or \"tsv\")")]
pub struct ParseFormatError(String);

impl FromStr for ExportFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "tsv" | "txt" => Ok(ExportFormat::Tsv),
            other => Err(ParseFormatError(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the reading store is empty")]
    EmptyDataset,
    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("export serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

const HEADER: [&str; 8] = [
    "timestamp",
    "sensor",
    "valid",
    "accel_x",
    "accel_y",
    "accel_z",
    "temperature",
    "force",
];

/// One flattened export row; triaxial values become separate columns
#[derive(Debug, Serialize)]
struct Row {
    timestamp: String,
    sensor: &'static str,
    valid: bool,
    accel_x: Option<f64>,
    accel_y: Option<f64>,
    accel_z: Option<f64>,
    temperature: Option<f64>,
    force: Option<f64>,
}

impl Row {
    fn from_reading(reading: &Reading) -> Self {
        let mut row = Row {
            timestamp: reading.timestamp.to_rfc3339(),
            sensor: reading.kind.label(),
            valid: reading.is_valid(),
            accel_x: None,
            accel_y: None,
            accel_z: None,
            temperature: None,
            force: None,
        };
        match reading.value {
            Some(SampleValue::Triaxial { x, y, z }) => {
                row.accel_x = Some(x);
                row.accel_y = Some(y);
                row.accel_z = Some(z);
            }
            Some(SampleValue::Scalar(v)) => match reading.kind {
                SensorKind::Temperature => row.temperature = Some(v),
                SensorKind::Force => row.force = Some(v),
                SensorKind::Acceleration => {}
            },
            None => {}
        }
        row
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Serialize every reading in store order to `writer`.
pub fn write_export<W: Write>(
    readings: &[Reading],
    writer: &mut W,
    format: ExportFormat,
) -> Result<(), ExportError> {
    if readings.is_empty() {
        return Err(ExportError::EmptyDataset);
    }
    match format {
        ExportFormat::Json => {
            let rows: Vec<Row> = readings.iter().map(Row::from_reading).collect();
            serde_json::to_writer_pretty(&mut *writer, &rows)?;
            writeln!(writer)?;
        }
        ExportFormat::Tsv => {
            writeln!(writer, "{}", HEADER.join("\t"))?;
            for reading in readings {
                let row = Row::from_reading(reading);
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    row.timestamp,
                    row.sensor,
                    row.valid,
                    cell(row.accel_x),
                    cell(row.accel_y),
                    cell(row.accel_z),
                    cell(row.temperature),
                    cell(row.force),
                )?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Export to a file, finalized only on full success.
///
/// Writes to a sibling `.tmp` path and renames into place, so a failed
/// export never leaves a partial file behind. An empty store fails before
/// anything touches the filesystem.
pub fn export_to_path(
    readings: &[Reading],
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    if readings.is_empty() {
        return Err(ExportError::EmptyDataset);
    }
    let tmp = path.with_extension("tmp");
    let result: Result<(), ExportError> = (|| {
        let file = fs::File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        write_export(readings, &mut writer, format)?;
        writer.into_inner().map_err(|e| e.into_error())?;
        Ok(())
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)?;
    info!("exported {} readings to {}", readings.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn force(v: f64) -> Reading {
        Reading::valid(SensorKind::Force, SampleValue::Scalar(v))
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rigdaq-export-{}-{name}", std::process::id()))
    }

    #[test]
    fn tsv_export_writes_header_and_one_row_per_reading() {
        let mut out = Vec::new();
        write_export(&[force(5.0)], &mut out, ExportFormat::Tsv).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER.join("\t"));
        assert!(lines[1].contains("force"));
        assert!(lines[1].contains('5'));
    }

    #[test]
    fn triaxial_values_flatten_into_separate_columns() {
        let reading = Reading::valid(
            SensorKind::Acceleration,
            SampleValue::Triaxial {
                x: 0.5,
                y: -0.25,
                z: 1.0,
            },
        );
        let mut out = Vec::new();
        write_export(&[reading], &mut out, ExportFormat::Tsv).unwrap();
        let text = String::from_utf8(out).unwrap();
        let row = text.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split('\t').collect();
        assert_eq!(cells.len(), HEADER.len());
        assert_eq!(cells[3], "0.5");
        assert_eq!(cells[4], "-0.25");
        assert_eq!(cells[5], "1");
        assert_eq!(cells[7], "");
    }

    #[test]
    fn json_export_round_trips_as_an_array_of_rows() {
        let mut out = Vec::new();
        write_export(
            &[force(5.0), Reading::invalid(SensorKind::Temperature)],
            &mut out,
            ExportFormat::Json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["force"], 5.0);
        assert_eq!(rows[1]["valid"], false);
    }

    #[test]
    fn empty_store_fails_without_creating_a_file() {
        let mut out = Vec::new();
        assert!(matches!(
            write_export(&[], &mut out, ExportFormat::Tsv),
            Err(ExportError::EmptyDataset)
        ));
        assert!(out.is_empty());

        let path = temp_path("empty.tsv");
        assert!(matches!(
            export_to_path(&[], &path, ExportFormat::Tsv),
            Err(ExportError::EmptyDataset)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn file_export_finalizes_atomically() {
        let path = temp_path("ok.tsv");
        export_to_path(&[force(5.0)], &path, ExportFormat::Tsv).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!path.with_extension("tmp").exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn format_names_parse_case_insensitively() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("tsv".parse::<ExportFormat>().unwrap(), ExportFormat::Tsv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Tsv);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
