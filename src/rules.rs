use serde::{Deserialize, Serialize};
use std::io;
use std::{path::PathBuf, str::Utf8Error};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("Failed to read rules file: {error}")]
    FileRead { error: io::Error },

    #[error("Rules file is not valid UTF-8: {error}")]
    FileParse { error: Utf8Error },

    #[error("Failed to parse rules JSON: {error}")]
    JsonParse { error: serde_json::Error },

    #[error("Invalid rule '{name}': {cause}")]
    InvalidValue { name: String, cause: String },
}

/// Heuristics deciding that two street names denote the same street.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityRules {
    /// Names are similar when the word overlap ratio is strictly above this.
    pub overlap_threshold: f64,
    pub subset_is_similar: bool,
    /// Leading qualifier tokens removed before comparing (matched after lowercasing).
    pub qualifier_prefixes: Vec<String>,
}

impl Default for SimilarityRules {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.7,
            subset_is_similar: true,
            qualifier_prefixes: vec![
                "רחוב ".to_string(),
                "שדרות ".to_string(),
                "דרך ".to_string(),
                "רח' ".to_string(),
                "שד' ".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRules {
    #[serde(default = "default_min_distance_m")]
    pub min_distance_m: f64,

    #[serde(default)]
    pub max_distance_m: Option<f64>,

    #[serde(default)]
    pub similarity: SimilarityRules,
}

fn default_min_distance_m() -> f64 {
    150.
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self {
            min_distance_m: default_min_distance_m(),
            max_distance_m: None,
            similarity: SimilarityRules::default(),
        }
    }
}

impl DetectionRules {
    #[tracing::instrument]
    pub fn read_from_file(file: PathBuf) -> Result<Self, RulesError> {
        let file = std::fs::read(file).map_err(|error| RulesError::FileRead { error })?;
        let text =
            std::str::from_utf8(&file[..]).map_err(|error| RulesError::FileParse { error })?;
        let rules: DetectionRules =
            serde_json::from_str(text).map_err(|error| RulesError::JsonParse { error })?;

        Ok(rules)
    }

    pub fn read(file: Option<PathBuf>) -> Result<Self, RulesError> {
        match file {
            None => Ok(Self::default()),
            Some(file) => Self::read_from_file(file),
        }
    }

    /// Command line values take precedence over the rules file.
    pub fn with_overrides(
        mut self,
        min_distance_m: Option<f64>,
        max_distance_m: Option<f64>,
    ) -> Self {
        if let Some(min_distance_m) = min_distance_m {
            self.min_distance_m = min_distance_m;
        }
        if max_distance_m.is_some() {
            self.max_distance_m = max_distance_m;
        }
        self
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if !self.min_distance_m.is_finite() || self.min_distance_m < 0. {
            return Err(RulesError::InvalidValue {
                name: "min_distance_m".to_string(),
                cause: format!("must be a non-negative number, got {}", self.min_distance_m),
            });
        }
        if let Some(max_distance_m) = self.max_distance_m {
            if max_distance_m.is_nan() {
                return Err(RulesError::InvalidValue {
                    name: "max_distance_m".to_string(),
                    cause: "must be a number".to_string(),
                });
            }
            if max_distance_m < self.min_distance_m {
                warn!(
                    min_distance_m = self.min_distance_m,
                    max_distance_m, "Distance band is empty, no duplicates will be found"
                );
            }
        }
        let threshold = self.similarity.overlap_threshold;
        if !(threshold > 0. && threshold <= 1.) {
            return Err(RulesError::InvalidValue {
                name: "similarity.overlap_threshold".to_string(),
                cause: format!("must be within (0, 1], got {threshold}"),
            });
        }
        Ok(())
    }

    pub fn distance_in_band(&self, distance: f64) -> bool {
        distance >= self.min_distance_m
            && self
                .max_distance_m
                .map_or(true, |max_distance_m| distance <= max_distance_m)
    }
}
