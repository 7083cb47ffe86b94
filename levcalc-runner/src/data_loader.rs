//! Input loading for the runner.
//!
//! Resolves the reference and drive series named by an [`InputsConfig`].
//! Fallback policy per series:
//! 1. If the file exists → parse it
//! 2. If it is missing and `synthetic` is set → generate a synthetic series (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only mode. Results computed from it carry
//! `has_synthetic = true` all the way into the saved manifest.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use levcalc_core::data::{load_calendar_csv, CsvOptions, DataError, ParseReport};
use levcalc_core::fingerprint::dataset_hash;
use levcalc_core::{CalendarDate, CalendarSeries, SeriesBuilder, SeriesError, SeriesPair};

use crate::config::InputsConfig;

/// Which input a series plays in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputRole {
    Reference,
    Drive,
}

impl InputRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputRole::Reference => "reference",
            InputRole::Drive => "drive",
        }
    }
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Errors from the input loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{role} series not found at {} (use --synthetic for synthetic data)", path.display())]
    NotFound { role: InputRole, path: PathBuf },

    #[error("{role} series: {source}")]
    Data {
        role: InputRole,
        #[source]
        source: DataError,
    },

    #[error("drive value {value} on {date} must be positive and finite")]
    InvalidDriveValue { date: CalendarDate, value: f64 },

    #[error("synthetic series: {0}")]
    Synthetic(#[from] SeriesError),
}

/// Options controlling how inputs are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Generate synthetic series for missing files.
    pub synthetic: bool,
    /// First date of generated series.
    pub synthetic_start: NaiveDate,
    /// Last date of generated series.
    pub synthetic_end: NaiveDate,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            synthetic: false,
            synthetic_start: NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN),
            synthetic_end: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl LoadOptions {
    pub fn synthetic() -> Self {
        Self {
            synthetic: true,
            ..Self::default()
        }
    }
}

/// Provenance of one loaded series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub role: InputRole,
    pub path: PathBuf,
    pub source: DataSource,
    pub report: ParseReport,
}

/// Both series plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub inputs: SeriesPair,
    pub reference: SourceInfo,
    pub drive: SourceInfo,
    /// BLAKE3 over both series.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Load both series, with synthetic fallback when enabled.
pub fn load_inputs(config: &InputsConfig, opts: &LoadOptions) -> Result<LoadedInputs, LoadError> {
    let csv_options = config.csv_options();
    let (reference, reference_info) =
        load_series(InputRole::Reference, &config.reference, &csv_options, opts)?;
    let (drive, drive_info) = load_series(InputRole::Drive, &config.drive, &csv_options, opts)?;

    validate_drive(&drive)?;

    let inputs = SeriesPair::new(drive, reference);
    let dataset_hash = dataset_hash(&inputs);
    let has_synthetic =
        reference_info.source == DataSource::Synthetic || drive_info.source == DataSource::Synthetic;

    info!(
        reference_days = inputs.reference.len(),
        drive_days = inputs.drive.len(),
        has_synthetic,
        "inputs loaded"
    );

    Ok(LoadedInputs {
        inputs,
        reference: reference_info,
        drive: drive_info,
        dataset_hash,
        has_synthetic,
    })
}

fn load_series(
    role: InputRole,
    path: &Path,
    csv_options: &CsvOptions,
    opts: &LoadOptions,
) -> Result<(CalendarSeries, SourceInfo), LoadError> {
    if path.exists() {
        let parsed =
            load_calendar_csv(path, csv_options).map_err(|source| LoadError::Data { role, source })?;
        if parsed.report.duplicates > 0 {
            warn!(%role, duplicates = parsed.report.duplicates, "duplicate dates, later rows kept");
        }
        let info = SourceInfo {
            role,
            path: path.to_path_buf(),
            source: DataSource::Csv,
            report: parsed.report,
        };
        return Ok((parsed.series, info));
    }

    if opts.synthetic {
        warn!(
            %role,
            path = %path.display(),
            "file missing, generating synthetic data; results will be tagged as synthetic"
        );
        let series = generate_synthetic_series(role, opts.synthetic_start, opts.synthetic_end)?;
        let report = ParseReport {
            rows: series.len(),
            duplicates: 0,
            first: series.first_date(),
            last: series.last_date(),
        };
        let info = SourceInfo {
            role,
            path: path.to_path_buf(),
            source: DataSource::Synthetic,
            report,
        };
        return Ok((series, info));
    }

    Err(LoadError::NotFound {
        role,
        path: path.to_path_buf(),
    })
}

/// Drive values are return bases; they must be strictly positive.
fn validate_drive(drive: &CalendarSeries) -> Result<(), LoadError> {
    match drive
        .iter()
        .find(|(_, v)| !(v.close.is_finite() && v.close > 0.0))
    {
        Some((date, v)) => Err(LoadError::InvalidDriveValue {
            date,
            value: v.close,
        }),
        None => Ok(()),
    }
}

/// Generate a deterministic weekday series for `role`.
///
/// The drive series is a random walk from 100.0; the reference series is a
/// rate starting at 3% that drifts slowly within `[0, 12]`.
fn generate_synthetic_series(
    role: InputRole,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<CalendarSeries, SeriesError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from the role name
    let seed: [u8; 32] = *blake3::hash(role.as_str().as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut builder = SeriesBuilder::new();
    let mut value = match role {
        InputRole::Drive => 100.0_f64,
        InputRole::Reference => 3.0_f64,
    };

    for date in start.iter_days().take_while(|d| *d <= end) {
        let weekday = date.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            continue;
        }

        value = match role {
            InputRole::Drive => value * (1.0 + rng.gen_range(-0.02..0.0205)),
            InputRole::Reference => (value + rng.gen_range(-0.03..0.03)).clamp(0.0, 12.0),
        };
        builder.insert_close(date, value)?;
    }

    Ok(builder.build())
}
