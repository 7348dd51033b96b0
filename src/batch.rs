use std::{
    cmp::Reverse,
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use tracing::{error, info, warn};

use crate::{
    intersections::{find_duplicate_intersections, DuplicateIntersection},
    osm_data::{data_reader::OsmDataReader, DataSource, OsmDataReaderError},
    result_writer::{CityIntersection, DataDestination, ResultWriter, ResultWriterError},
    rules::DetectionRules,
};

pub const DEFAULT_OUTPUT_DIR: &str = "duplicate_intersections_results";
pub const UNIFIED_FILE_STEM: &str = "all_cities_unified";

const BUILTIN_CITIES: &str = include_str!("cities.txt");

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read cities file {file:?}: {error}")]
    CitiesFileRead { file: PathBuf, error: io::Error },

    #[error("No cities to process")]
    NoCities,

    #[error("Failed to create directory {dir:?}: {error}")]
    CreateDir { dir: PathBuf, error: io::Error },

    #[error("Failed to list directory {dir:?}: {error}")]
    ReadDir { dir: PathBuf, error: io::Error },

    #[error("Failed to read results {file:?}: {error}")]
    ResultsRead { file: PathBuf, error: io::Error },

    #[error("Failed to parse results {file:?}: {error}")]
    ResultsParse {
        file: PathBuf,
        error: serde_json::Error,
    },

    #[error("Failed to write results: {error}")]
    ResultWrite { error: ResultWriterError },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CityOutcome {
    Found { count: usize, max_distance: f64 },
    NoResults,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitySummary {
    pub city: String,
    pub outcome: CityOutcome,
}

impl CitySummary {
    fn rank(&self) -> i64 {
        match self.outcome {
            CityOutcome::Found { count, .. } => count as i64,
            CityOutcome::NoResults => 0,
            CityOutcome::Failed { .. } => -1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub output_dir: PathBuf,
    pub pause: Duration,
    pub overpass_url: String,
    pub rules: DetectionRules,
}

pub fn city_file_stem(city: &str) -> String {
    format!("{city}_intersections")
}

/// Trimmed non-empty city names, first occurrence wins.
pub fn dedupe_cities<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect()
}

pub fn load_cities(cities_file: Option<&Path>) -> Result<Vec<String>, BatchError> {
    let cities = match cities_file {
        None => dedupe_cities(BUILTIN_CITIES.lines()),
        Some(file) => {
            let text = fs::read_to_string(file).map_err(|error| BatchError::CitiesFileRead {
                file: file.to_path_buf(),
                error,
            })?;
            dedupe_cities(text.lines())
        }
    };
    if cities.is_empty() {
        return Err(BatchError::NoCities);
    }
    Ok(cities)
}

pub fn detect_in(
    source: DataSource,
    rules: &DetectionRules,
) -> Result<Vec<DuplicateIntersection>, OsmDataReaderError> {
    let graph = OsmDataReader::new(source).read_data()?;
    Ok(find_duplicate_intersections(&graph, rules))
}

/// Writes `<city>_intersections.{json,csv,gpx}` into `dir`.
pub fn write_city_results(
    dir: &Path,
    city: &str,
    records: &[DuplicateIntersection],
) -> Result<(), ResultWriterError> {
    for dest in DataDestination::files(dir, &city_file_stem(city)) {
        ResultWriter::write(dest, records)?;
    }
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), BatchError> {
    fs::create_dir_all(dir).map_err(|error| BatchError::CreateDir {
        dir: dir.to_path_buf(),
        error,
    })
}

pub struct BatchRunner {
    settings: BatchSettings,
}

impl BatchRunner {
    pub fn new(settings: BatchSettings) -> Self {
        Self { settings }
    }

    #[tracing::instrument(skip_all, fields(cities = cities.len()))]
    pub fn run(&self, cities: &[String]) -> Result<Vec<CitySummary>, BatchError> {
        let summary = self.run_with(cities, |city| {
            detect_in(
                DataSource::Overpass {
                    city: city.to_string(),
                    url: self.settings.overpass_url.clone(),
                },
                &self.settings.rules,
            )
        })?;

        let unified = unify(&self.settings.output_dir)?;
        info!(records = unified.len(), "Unified results written");

        Ok(summary)
    }

    /// Processes cities in order with `detect`, one failure does not stop the rest.
    pub fn run_with<F>(&self, cities: &[String], mut detect: F) -> Result<Vec<CitySummary>, BatchError>
    where
        F: FnMut(&str) -> Result<Vec<DuplicateIntersection>, OsmDataReaderError>,
    {
        create_dir(&self.settings.output_dir)?;
        info!(
            cities = cities.len(),
            output_dir = ?self.settings.output_dir,
            "Starting batch"
        );

        let mut summary = Vec::with_capacity(cities.len());
        for (idx, city) in cities.iter().enumerate() {
            info!(city = %city, "[{}/{}] Processing", idx + 1, cities.len());
            let outcome = match detect(city.as_str()) {
                Ok(records) if records.is_empty() => CityOutcome::NoResults,
                Ok(records) => {
                    let city_dir = self.settings.output_dir.join(city);
                    let written = create_dir(&city_dir).and_then(|()| {
                        write_city_results(&city_dir, city, &records)
                            .map_err(|error| BatchError::ResultWrite { error })
                    });
                    match written {
                        Ok(()) => CityOutcome::Found {
                            count: records.len(),
                            max_distance: records[0].distance,
                        },
                        Err(error) => CityOutcome::Failed {
                            error: error.to_string(),
                        },
                    }
                }
                Err(error) => CityOutcome::Failed {
                    error: error.to_string(),
                },
            };
            if let CityOutcome::Failed { error } = &outcome {
                error!(city = %city, error = %error, "City failed");
            }
            summary.push(CitySummary {
                city: city.clone(),
                outcome,
            });

            if idx + 1 < cities.len() && !self.settings.pause.is_zero() {
                thread::sleep(self.settings.pause);
            }
        }

        summary.sort_by_key(|item| Reverse(item.rank()));
        log_summary(&summary);

        Ok(summary)
    }
}

fn log_summary(summary: &[CitySummary]) {
    for item in summary {
        match &item.outcome {
            CityOutcome::Found {
                count,
                max_distance,
            } => info!(
                city = %item.city,
                count,
                max_distance_m = max_distance.round(),
                "Summary"
            ),
            CityOutcome::NoResults => info!(city = %item.city, "Summary: no results"),
            CityOutcome::Failed { error } => warn!(city = %item.city, error = %error, "Summary: failed"),
        }
    }
}

/// Merges every `<dir>/<city>/<city>_intersections.json`, farthest first.
pub fn collect_city_results(output_dir: &Path) -> Result<Vec<CityIntersection>, BatchError> {
    let entries = fs::read_dir(output_dir).map_err(|error| BatchError::ReadDir {
        dir: output_dir.to_path_buf(),
        error,
    })?;

    let mut city_dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| BatchError::ReadDir {
            dir: output_dir.to_path_buf(),
            error,
        })?;
        if entry.path().is_dir() {
            city_dirs.push(entry.path());
        }
    }
    city_dirs.sort();

    let mut all = Vec::new();
    for city_dir in city_dirs {
        let Some(city) = city_dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let file = city_dir.join(format!("{}.json", city_file_stem(city)));
        if !file.exists() {
            continue;
        }
        let text = fs::read_to_string(&file).map_err(|error| BatchError::ResultsRead {
            file: file.clone(),
            error,
        })?;
        let records: Vec<DuplicateIntersection> = serde_json::from_str(&text)
            .map_err(|error| BatchError::ResultsParse { file, error })?;
        all.extend(records.into_iter().map(|intersection| CityIntersection {
            city: city.to_string(),
            intersection,
        }));
    }

    all.sort_by(|a, b| b.intersection.distance.total_cmp(&a.intersection.distance));
    Ok(all)
}

#[tracing::instrument]
pub fn unify(output_dir: &Path) -> Result<Vec<CityIntersection>, BatchError> {
    let all = collect_city_results(output_dir)?;
    let cities: HashSet<&str> = all.iter().map(|record| record.city.as_str()).collect();
    info!(
        records = all.len(),
        cities = cities.len(),
        "Writing unified results"
    );

    for dest in DataDestination::files(output_dir, UNIFIED_FILE_STEM) {
        ResultWriter::write(dest, &all).map_err(|error| BatchError::ResultWrite { error })?;
    }
    Ok(all)
}
