//! Scenario configuration: TOML files and command-line scenario pairs.
//!
//! ```toml
//! [inputs]
//! reference = "USD.csv"
//! drive = "SP500.csv"
//!
//! [[scenario]]
//! leverage = 3.0
//! fee = 1.0
//!
//! [output]
//! dir = "results"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use levcalc_core::data::csv_source::DEFAULT_DATE_FORMAT;
use levcalc_core::data::CsvOptions;
use levcalc_core::{ScenarioKey, ScenarioParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("at least one leverage/fee pair is required")]
    NoScenarios,

    #[error("scenario arguments must come in leverage/fee pairs, got {count} value(s)")]
    OddScenarioArgs { count: usize },

    #[error("'{value}' is not a finite number")]
    InvalidNumber { value: String },

    #[error("invalid scenario: leverage {leverage}, fee {fee}")]
    InvalidScenario { leverage: f64, fee: f64 },
}

/// Paths of the two input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Borrowing-rate series, percent per year.
    pub reference: PathBuf,
    /// Asset close series.
    pub drive: PathBuf,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl InputsConfig {
    pub fn new(reference: impl Into<PathBuf>, drive: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            drive: drive.into(),
            date_format: default_date_format(),
        }
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions::with_date_format(self.date_format.clone())
    }

    /// Resolve relative paths against `base` (the config file's directory).
    fn resolve_against(&mut self, base: &Path) {
        if self.reference.is_relative() {
            self.reference = base.join(&self.reference);
        }
        if self.drive.is_relative() {
            self.drive = base.join(&self.drive);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_save")]
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            save: default_save(),
        }
    }
}

/// A complete batch description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub inputs: InputsConfig,
    #[serde(rename = "scenario", default)]
    pub scenarios: Vec<ScenarioParams>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_save() -> bool {
    true
}

impl SimulationConfig {
    /// Load and validate a config file. Relative input paths are resolved
    /// against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.inputs.resolve_against(base);
        }
        Ok(config)
    }

    /// Parse and validate a config string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scenario_keys().map(|_| ())
    }

    /// Scenario keys in file order, duplicates collapsed.
    pub fn scenario_keys(&self) -> Result<Vec<ScenarioKey>, ConfigError> {
        if self.scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }
        let keys = self
            .scenarios
            .iter()
            .map(|p| {
                ScenarioKey::new(p.leverage, p.fee).map_err(|_| ConfigError::InvalidScenario {
                    leverage: p.leverage,
                    fee: p.fee,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dedup_keys(keys))
    }
}

/// Parse `LEVERAGE FEE [LEVERAGE FEE ...]` tokens.
///
/// Rejects an empty list, an odd number of tokens, and any token that is
/// not a finite number. Duplicate pairs are collapsed.
pub fn parse_scenario_args(args: &[String]) -> Result<Vec<ScenarioKey>, ConfigError> {
    if args.is_empty() {
        return Err(ConfigError::NoScenarios);
    }
    if args.len() % 2 != 0 {
        return Err(ConfigError::OddScenarioArgs { count: args.len() });
    }

    let numbers = args
        .iter()
        .map(|s| parse_number(s))
        .collect::<Result<Vec<f64>, _>>()?;

    let keys = numbers
        .chunks_exact(2)
        .map(|pair| {
            ScenarioKey::new(pair[0], pair[1]).map_err(|_| ConfigError::InvalidScenario {
                leverage: pair[0],
                fee: pair[1],
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dedup_keys(keys))
}

fn parse_number(token: &str) -> Result<f64, ConfigError> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            value: token.to_string(),
        })
}

fn dedup_keys(keys: Vec<ScenarioKey>) -> Vec<ScenarioKey> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter().filter(|k| seen.insert(*k)).collect()
}
