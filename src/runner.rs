use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use crate::{
    batch::{
        self, load_cities, write_city_results, BatchError, BatchRunner, BatchSettings,
        DEFAULT_OUTPUT_DIR,
    },
    intersections::DuplicateIntersection,
    osm_data::{overpass::DEFAULT_OVERPASS_URL, DataSource, OsmDataReaderError},
    result_writer::{DataDestination, ResultWriter, ResultWriterError},
    rules::{DetectionRules, RulesError},
};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Input file {filename:?} must end with .json or .pbf")]
    InputFileFormatIncorrect { filename: PathBuf },

    #[error("Rules error: {error}")]
    Rules { error: RulesError },

    #[error("Failed to read street data: {error}")]
    DataRead { error: OsmDataReaderError },

    #[error("Failed to write results: {error}")]
    ResultWrite { error: ResultWriterError },

    #[error("Failed to create output directory {dir:?}: {error}")]
    OutputDir { dir: PathBuf, error: std::io::Error },

    #[error("Batch error: {error}")]
    Batch { error: BatchError },
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    pub log_level: Level,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub mode: CliMode,
}

#[derive(Args, Debug, Clone)]
pub struct RuleArgs {
    /// JSON file with detection rules
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Meters, overrides the rules file
    #[arg(long, value_name = "METERS")]
    min_distance: Option<f64>,

    /// Meters, overrides the rules file
    #[arg(long, value_name = "METERS")]
    max_distance: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum CliMode {
    /// Find duplicate intersections in one city
    City {
        name: String,

        /// Overpass JSON or OSM PBF file, downloaded from Overpass when missing
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        #[arg(long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,

        #[arg(long, value_name = "URL", default_value = DEFAULT_OVERPASS_URL)]
        overpass_url: String,

        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Process a list of cities one after another
    Batch {
        /// One city per line
        #[arg(long, value_name = "FILE")]
        cities_file: Option<PathBuf>,

        #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        #[arg(long, value_name = "SECONDS", default_value_t = 2)]
        pause_secs: u64,

        #[arg(long, value_name = "URL", default_value = DEFAULT_OVERPASS_URL)]
        overpass_url: String,

        #[command(flatten)]
        rules: RuleArgs,
    },
    /// Merge per-city results of a batch run
    Unify {
        #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

fn get_data_source(
    city: &str,
    input: Option<PathBuf>,
    overpass_url: String,
) -> Result<DataSource, RunnerError> {
    let Some(file) = input else {
        return Ok(DataSource::Overpass {
            city: city.to_string(),
            url: overpass_url,
        });
    };
    let file_name = file.to_string_lossy().to_lowercase();
    if file_name.ends_with(".json") {
        Ok(DataSource::JsonFile { file })
    } else if file_name.ends_with(".pbf") {
        Ok(DataSource::PbfFile { file })
    } else {
        Err(RunnerError::InputFileFormatIncorrect { filename: file })
    }
}

fn get_rules(args: RuleArgs) -> Result<DetectionRules, RunnerError> {
    let rules = DetectionRules::read(args.rules)
        .map_err(|error| RunnerError::Rules { error })?
        .with_overrides(args.min_distance, args.max_distance);
    rules
        .validate()
        .map_err(|error| RunnerError::Rules { error })?;
    Ok(rules)
}

pub struct Runner {
    mode: CliMode,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self { mode: cli.mode }
    }

    pub fn run(self) -> Result<(), RunnerError> {
        match self.mode {
            CliMode::City {
                name,
                input,
                output_dir,
                overpass_url,
                rules,
            } => {
                let data_source = get_data_source(&name, input, overpass_url)?;
                Self::run_city(&name, data_source, get_rules(rules)?, output_dir)
            }
            CliMode::Batch {
                cities_file,
                output_dir,
                pause_secs,
                overpass_url,
                rules,
            } => {
                let cities = load_cities(cities_file.as_deref())
                    .map_err(|error| RunnerError::Batch { error })?;
                let settings = BatchSettings {
                    output_dir,
                    pause: Duration::from_secs(pause_secs),
                    overpass_url,
                    rules: get_rules(rules)?,
                };
                BatchRunner::new(settings)
                    .run(&cities)
                    .map_err(|error| RunnerError::Batch { error })?;
                Ok(())
            }
            CliMode::Unify { output_dir } => {
                batch::unify(&output_dir).map_err(|error| RunnerError::Batch { error })?;
                Ok(())
            }
        }
    }

    #[tracing::instrument(skip(data_source, rules))]
    fn run_city(
        city: &str,
        data_source: DataSource,
        rules: DetectionRules,
        output_dir: PathBuf,
    ) -> Result<(), RunnerError> {
        let records: Vec<DuplicateIntersection> = batch::detect_in(data_source, &rules)
            .map_err(|error| RunnerError::DataRead { error })?;

        ResultWriter::write(DataDestination::Stdout, &records)
            .map_err(|error| RunnerError::ResultWrite { error })?;

        if records.is_empty() {
            info!("Nothing to write");
            return Ok(());
        }

        std::fs::create_dir_all(&output_dir).map_err(|error| RunnerError::OutputDir {
            dir: output_dir.clone(),
            error,
        })?;
        write_city_results(&output_dir, city, &records)
            .map_err(|error| RunnerError::ResultWrite { error })?;

        Ok(())
    }
}
