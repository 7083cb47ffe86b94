//! Batch runner: wires loaded inputs, the scenario cache, and metrics.
//!
//! `run_batch()` is the single entry point used by both the CLI and the TUI:
//! it computes every scenario in parallel through a [`ScenarioCache`] and
//! packages each path with its metrics and a deterministic run id.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use levcalc_core::fingerprint::run_id;
use levcalc_core::{CacheError, OutputSeries, ScenarioCache, ScenarioKey, WalkSummary};

use crate::data_loader::{LoadedInputs, SourceInfo};
use crate::metrics::PathMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no scenarios to run")]
    NoScenarios,
    #[error("simulation failed: {0}")]
    Cache(#[from] CacheError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// One computed scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// BLAKE3 of the dataset hash and the scenario parameters.
    pub run_id: String,
    pub key: ScenarioKey,
    /// `"{leverage:.2}X, {fee:.2}%"`.
    pub label: String,
    pub metrics: PathMetrics,
    pub points: OutputSeries,
}

impl ScenarioResult {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Complete result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub sources: Vec<SourceInfo>,
    /// Walker diagnostics, identical for every scenario.
    pub coverage: WalkSummary,
    /// In the order the scenarios were requested.
    pub scenarios: Vec<ScenarioResult>,
    pub warnings: Vec<String>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BatchResult {
    /// True when no scenario produced a single point.
    pub fn all_empty(&self) -> bool {
        self.scenarios.iter().all(ScenarioResult::is_empty)
    }

    pub fn scenario(&self, key: &ScenarioKey) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.key == *key)
    }
}

/// Compute every scenario over the loaded inputs: no I/O.
pub fn run_batch(loaded: &LoadedInputs, keys: &[ScenarioKey]) -> Result<BatchResult, RunError> {
    if keys.is_empty() {
        return Err(RunError::NoScenarios);
    }

    let mut cache = ScenarioCache::new(loaded.inputs.clone());
    cache.compute_batch(keys)?;
    let coverage = cache.coverage();

    let mut scenarios = Vec::with_capacity(keys.len());
    for key in keys {
        // compute_batch succeeded, so every key is stored.
        let Some(points) = cache.get_key(key).cloned() else {
            continue;
        };
        scenarios.push(ScenarioResult {
            run_id: run_id(&loaded.dataset_hash, key),
            key: *key,
            label: key.label(),
            metrics: PathMetrics::compute(&points),
            points,
        });
    }

    let warnings = collect_warnings(loaded, &coverage, &scenarios);
    for w in &warnings {
        warn!("{w}");
    }
    info!(
        scenarios = scenarios.len(),
        points = coverage.emitted,
        dataset = %loaded.dataset_hash,
        "batch complete"
    );

    Ok(BatchResult {
        schema_version: SCHEMA_VERSION,
        dataset_hash: loaded.dataset_hash.clone(),
        has_synthetic: loaded.has_synthetic,
        sources: vec![loaded.reference.clone(), loaded.drive.clone()],
        coverage,
        scenarios,
        warnings,
    })
}

fn collect_warnings(
    loaded: &LoadedInputs,
    coverage: &WalkSummary,
    scenarios: &[ScenarioResult],
) -> Vec<String> {
    let mut warnings = Vec::new();
    if loaded.has_synthetic {
        warnings.push("results computed on synthetic data".to_string());
    }
    for s in scenarios.iter().filter(|s| s.is_empty()) {
        warnings.push(format!(
            "scenario {}: no data (drive and reference series never share a date)",
            s.label
        ));
    }
    if coverage.carried > 0 {
        warnings.push(format!(
            "{} drive day(s) reused the previous reference value",
            coverage.carried
        ));
    }
    for year in &coverage.degenerate_years {
        warnings.push(format!("year {year} has no drive entries and was skipped"));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{DataSource, InputRole};
    use chrono::NaiveDate;
    use levcalc_core::data::ParseReport;
    use levcalc_core::fingerprint::dataset_hash;
    use levcalc_core::{CalendarSeries, SeriesBuilder, SeriesPair};

    fn series(points: &[(u32, f64)]) -> CalendarSeries {
        let mut b = SeriesBuilder::new();
        for &(day, v) in points {
            b.insert_close(NaiveDate::from_ymd_opt(2020, 1, day).unwrap(), v)
                .unwrap();
        }
        b.build()
    }

    fn info(role: InputRole) -> SourceInfo {
        SourceInfo {
            role,
            path: format!("{role}.csv").into(),
            source: DataSource::Csv,
            report: ParseReport::default(),
        }
    }

    fn loaded(drive: CalendarSeries, reference: CalendarSeries) -> LoadedInputs {
        let inputs = SeriesPair::new(drive, reference);
        LoadedInputs {
            dataset_hash: dataset_hash(&inputs),
            inputs,
            reference: info(InputRole::Reference),
            drive: info(InputRole::Drive),
            has_synthetic: false,
        }
    }

    fn keys(pairs: &[(f64, f64)]) -> Vec<ScenarioKey> {
        pairs
            .iter()
            .map(|&(l, f)| ScenarioKey::new(l, f).unwrap())
            .collect()
    }

    #[test]
    fn scenarios_keep_request_order() {
        let l = loaded(
            series(&[(2, 100.0), (3, 102.0), (6, 101.0)]),
            series(&[(2, 5.0), (3, 5.0)]),
        );
        let result = run_batch(&l, &keys(&[(3.0, 1.0), (1.0, 0.0), (2.0, 0.6)])).unwrap();

        let labels: Vec<&str> = result.scenarios.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["3.00X, 1.00%", "1.00X, 0.00%", "2.00X, 0.60%"]);
        assert!(result.scenarios.iter().all(|s| s.points.len() == 3));
        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert!(!result.all_empty());
    }

    #[test]
    fn run_ids_are_distinct_and_stable() {
        let l = loaded(series(&[(2, 100.0), (3, 101.0)]), series(&[(2, 1.0)]));
        let k = keys(&[(2.0, 0.5), (3.0, 0.5)]);
        let a = run_batch(&l, &k).unwrap();
        let b = run_batch(&l, &k).unwrap();
        assert_ne!(a.scenarios[0].run_id, a.scenarios[1].run_id);
        assert_eq!(a.scenarios[0].run_id, b.scenarios[0].run_id);
    }

    #[test]
    fn carried_days_produce_a_warning() {
        let l = loaded(
            series(&[(2, 100.0), (3, 102.0), (6, 101.0)]),
            series(&[(2, 5.0), (3, 5.0)]),
        );
        let result = run_batch(&l, &keys(&[(2.0, 0.0)])).unwrap();
        assert_eq!(result.coverage.carried, 1);
        assert!(result.warnings.iter().any(|w| w.contains("reused")));
    }

    #[test]
    fn disjoint_inputs_give_empty_scenarios() {
        let drive = series(&[(2, 100.0), (3, 101.0)]);
        let mut b = SeriesBuilder::new();
        b.insert_close(NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(), 1.0)
            .unwrap();
        let l = loaded(drive, b.build());

        let result = run_batch(&l, &keys(&[(2.0, 0.5)])).unwrap();
        assert!(result.all_empty());
        assert_eq!(result.scenarios[0].metrics, PathMetrics::default());
        assert!(result.warnings.iter().any(|w| w.contains("no data")));
    }

    #[test]
    fn empty_key_list_is_rejected() {
        let l = loaded(series(&[(2, 100.0)]), series(&[(2, 1.0)]));
        assert!(matches!(run_batch(&l, &[]), Err(RunError::NoScenarios)));
    }

    #[test]
    fn scenario_lookup_by_key() {
        let l = loaded(series(&[(2, 100.0), (3, 101.0)]), series(&[(2, 1.0)]));
        let k = keys(&[(2.0, 0.5)]);
        let result = run_batch(&l, &k).unwrap();
        assert!(result.scenario(&k[0]).is_some());
        assert!(result.scenario(&ScenarioKey::new(9.0, 9.0).unwrap()).is_none());
    }
}
