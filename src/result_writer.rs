use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::{
    gpx_writer::{GpxWriter, GpxWriterError},
    intersections::DuplicateIntersection,
};

pub const STDOUT_TOP_COUNT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ResultWriterError {
    #[error("JSON Serialization error {error}")]
    SerializeJson { error: serde_json::Error },

    #[error("CSV writing failed: {error}")]
    Csv { error: csv::Error },

    #[error("GPX writing failed: {error}")]
    Gpx { error: GpxWriterError },

    #[error("Failed to write to stdout: {error}")]
    Stdout { error: io::Error },

    #[error("Failed to write to file: {error}")]
    FileWrite { error: io::Error },
}

/// A duplicate intersection tagged with the city it was found in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityIntersection {
    pub city: String,
    #[serde(flatten)]
    pub intersection: DuplicateIntersection,
}

/// Anything that can be written out as a result row.
pub trait ExportRecord: Serialize {
    const CSV_HEADER: &'static [&'static str];

    fn csv_record(&self) -> Vec<String>;

    fn intersection(&self) -> &DuplicateIntersection;

    fn city(&self) -> Option<&str> {
        None
    }

    fn title(&self) -> String {
        let intersection = self.intersection();
        format!("{} ⚬ {}", intersection.street1, intersection.street2)
    }
}

fn intersection_columns(intersection: &DuplicateIntersection) -> Vec<String> {
    vec![
        intersection.street1.clone(),
        intersection.street2.clone(),
        format!("{:.0}", intersection.distance),
        intersection.location1.lat.to_string(),
        intersection.location1.lon.to_string(),
        intersection.location2.lat.to_string(),
        intersection.location2.lon.to_string(),
    ]
}

impl ExportRecord for DuplicateIntersection {
    const CSV_HEADER: &'static [&'static str] = &[
        "street1",
        "street2",
        "distance_m",
        "lat1",
        "lon1",
        "lat2",
        "lon2",
    ];

    fn csv_record(&self) -> Vec<String> {
        intersection_columns(self)
    }

    fn intersection(&self) -> &DuplicateIntersection {
        self
    }
}

impl ExportRecord for CityIntersection {
    const CSV_HEADER: &'static [&'static str] = &[
        "city",
        "street1",
        "street2",
        "distance_m",
        "lat1",
        "lon1",
        "lat2",
        "lon2",
    ];

    fn csv_record(&self) -> Vec<String> {
        let mut record = vec![self.city.clone()];
        record.extend(intersection_columns(&self.intersection));
        record
    }

    fn intersection(&self) -> &DuplicateIntersection {
        &self.intersection
    }

    fn city(&self) -> Option<&str> {
        Some(&self.city)
    }

    fn title(&self) -> String {
        format!(
            "[{}] {} ⚬ {}",
            self.city, self.intersection.street1, self.intersection.street2
        )
    }
}

#[derive(Debug, Clone)]
pub enum DataDestination {
    Stdout,
    Json { file: PathBuf },
    Csv { file: PathBuf },
    Gpx { file: PathBuf },
}

impl DataDestination {
    /// `<stem>.json`, `<stem>.csv` and `<stem>.gpx` inside `dir`.
    pub fn files(dir: &Path, stem: &str) -> [DataDestination; 3] {
        [
            DataDestination::Json {
                file: dir.join(format!("{stem}.json")),
            },
            DataDestination::Csv {
                file: dir.join(format!("{stem}.csv")),
            },
            DataDestination::Gpx {
                file: dir.join(format!("{stem}.gpx")),
            },
        ]
    }
}

pub struct ResultWriter;
impl ResultWriter {
    #[tracing::instrument(skip(records), fields(records = records.len()))]
    pub fn write<T: ExportRecord>(
        dest: DataDestination,
        records: &[T],
    ) -> Result<(), ResultWriterError> {
        match dest {
            DataDestination::Stdout => {
                let mut stdout = io::stdout().lock();
                Self::write_listing(records, &mut stdout)
                    .map_err(|error| ResultWriterError::Stdout { error })
            }
            DataDestination::Json { file } => {
                let json = serde_json::to_string_pretty(records)
                    .map_err(|error| ResultWriterError::SerializeJson { error })?;

                trace!(
                    bytes_len = json.as_bytes().len(),
                    destination = ?file,
                    "Writing json"
                );

                std::fs::write(&file, json)
                    .map_err(|error| ResultWriterError::FileWrite { error })?;
                info!(file = ?file, "Results written");
                Ok(())
            }
            DataDestination::Csv { file } => {
                let mut writer = csv::Writer::from_path(&file)
                    .map_err(|error| ResultWriterError::Csv { error })?;
                writer
                    .write_record(T::CSV_HEADER)
                    .map_err(|error| ResultWriterError::Csv { error })?;
                for record in records {
                    writer
                        .write_record(record.csv_record())
                        .map_err(|error| ResultWriterError::Csv { error })?;
                }
                writer
                    .flush()
                    .map_err(|error| ResultWriterError::FileWrite { error })?;
                info!(file = ?file, "Results written");
                Ok(())
            }
            DataDestination::Gpx { file } => {
                GpxWriter::new(records, file.clone())
                    .write_gpx()
                    .map_err(|error| ResultWriterError::Gpx { error })?;
                info!(file = ?file, "Results written");
                Ok(())
            }
        }
    }

    /// Human readable listing of the first records, farthest first.
    pub fn write_listing<T: ExportRecord, W: Write>(records: &[T], out: &mut W) -> io::Result<()> {
        if records.is_empty() {
            writeln!(out, "No duplicate intersections found")?;
            return Ok(());
        }

        writeln!(out, "Found {} duplicate intersections", records.len())?;
        for (idx, record) in records.iter().take(STDOUT_TOP_COUNT).enumerate() {
            let intersection = record.intersection();
            writeln!(
                out,
                "{:>3}. {} ({:.0}m)",
                idx + 1,
                record.title(),
                intersection.distance
            )?;
            writeln!(out, "     {}", intersection.location1.map_link())?;
            writeln!(out, "     {}", intersection.location2.map_link())?;
        }
        if records.len() > STDOUT_TOP_COUNT {
            writeln!(out, "... and {} more", records.len() - STDOUT_TOP_COUNT)?;
        }
        Ok(())
    }
}
