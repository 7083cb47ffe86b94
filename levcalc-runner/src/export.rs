//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for batch results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: one price curve per scenario for external plotting tools
//! - **Markdown**: a human-readable report with one row per scenario
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use levcalc_core::{OutputSeries, ScenarioKey};

use crate::runner::{BatchResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BatchResult` to pretty JSON.
pub fn export_json(result: &BatchResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BatchResult to JSON")
}

/// Deserialize a `BatchResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BatchResult> {
    let result: BatchResult =
        serde_json::from_str(json).context("failed to deserialize BatchResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export one scenario's path as CSV with date, timestamp and value columns.
pub fn export_curve_csv(points: &OutputSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "timestamp", "value"])?;
    for p in points {
        wtr.write_record([
            &p.date.to_string(),
            &format!("{:.6}", p.timestamp),
            &format!("{:.6}", p.value),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// File name of a scenario's curve, e.g. `curve_3.00x_1.00pct.csv`.
pub fn curve_file_name(key: &ScenarioKey) -> String {
    format!("curve_{:.2}x_{:.2}pct.csv", key.leverage(), key.fee())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a batch run.
///
/// Creates a directory named `run_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `BatchResult`
/// - `report.md`: Markdown summary
/// - `curve_{leverage}x_{fee}pct.csv`: one per non-empty scenario
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BatchResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("run_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    // manifest.json
    let json = export_json(result)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    // report.md
    std::fs::write(run_dir.join("report.md"), generate_report(result))?;

    // curves
    for scenario in result.scenarios.iter().filter(|s| !s.is_empty()) {
        let csv = export_curve_csv(&scenario.points)?;
        std::fs::write(run_dir.join(curve_file_name(&scenario.key)), &csv)?;
    }

    info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `BatchResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BatchResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a batch run.
pub fn generate_report(result: &BatchResult) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Leveraged Price Report\n\n");

    // Metadata
    md.push_str("## Inputs\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    for source in &result.sources {
        let period = match (source.report.first, source.report.last) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "empty".to_string(),
        };
        md.push_str(&format!(
            "| {} | {} ({} rows, {}) |\n",
            source.role,
            source.path.display(),
            source.report.rows,
            period
        ));
    }
    if let Some(anchor) = result.coverage.anchor {
        md.push_str(&format!("| First Simulated Day | {anchor} |\n"));
    }
    md.push_str(&format!("| Simulated Days | {} |\n", result.coverage.emitted));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    // Scenarios
    md.push_str("## Scenarios\n\n");
    md.push_str("| Scenario | Final Value | Total Return | CAGR | Max Drawdown | Volatility |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- |\n");
    for s in &result.scenarios {
        if s.is_empty() {
            md.push_str(&format!("| {} | no data | | | | |\n", s.label));
            continue;
        }
        let m = &s.metrics;
        md.push_str(&format!(
            "| {} | {:.2} | {:.2}% | {:.2}% | {:.2}% | {:.2}% |\n",
            s.label,
            m.final_value,
            m.total_return * 100.0,
            m.cagr * 100.0,
            m.max_drawdown * 100.0,
            m.annualized_volatility * 100.0
        ));
    }
    md.push('\n');

    // Data Quality
    if !result.warnings.is_empty() {
        md.push_str("## Data Quality\n\n");
        for warn in &result.warnings {
            md.push_str(&format!("- {warn}\n"));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{DataSource, InputRole, LoadedInputs, SourceInfo};
    use crate::runner::run_batch;
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

    fn sample_result() -> BatchResult {
        let inputs = SeriesPair::new(
            series(&[(2, 100.0), (3, 102.0), (6, 101.0)]),
            series(&[(2, 5.0), (3, 5.0)]),
        );
        let source = |role: InputRole| SourceInfo {
            role,
            path: PathBuf::from(format!("{role}.csv")),
            source: DataSource::Csv,
            report: ParseReport::default(),
        };
        let loaded = LoadedInputs {
            dataset_hash: dataset_hash(&inputs),
            inputs,
            reference: source(InputRole::Reference),
            drive: source(InputRole::Drive),
            has_synthetic: false,
        };
        let keys = vec![
            ScenarioKey::new(3.0, 1.0).unwrap(),
            ScenarioKey::new(2.0, 0.6).unwrap(),
        ];
        run_batch(&loaded, &keys).unwrap()
    }

    #[test]
    fn json_round_trip_preserves_result() {
        let result = sample_result();
        let json = export_json(&result).unwrap();
        let restored = import_json(&json).unwrap();
        assert_eq!(restored.schema_version, SCHEMA_VERSION);
        assert_eq!(restored.dataset_hash, result.dataset_hash);
        assert_eq!(restored.coverage, result.coverage);
        assert_eq!(restored.warnings, result.warnings);
        for (a, b) in restored.scenarios.iter().zip(&result.scenarios) {
            assert_eq!(a.key, b.key);
            assert_eq!(a.run_id, b.run_id);
            assert_eq!(a.points.len(), b.points.len());
            for (pa, pb) in a.points.iter().zip(b.points.iter()) {
                assert_eq!(pa.date, pb.date);
                assert!((pa.value - pb.value).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn import_rejects_newer_schema() {
        let mut result = sample_result();
        result.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&result).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn import_defaults_missing_schema_version() {
        let result = sample_result();
        let mut value = serde_json::to_value(&result).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let restored = import_json(&value.to_string()).unwrap();
        assert_eq!(restored.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn curve_csv_has_header_and_one_row_per_point() {
        let result = sample_result();
        let csv = export_curve_csv(&result.scenarios[0].points).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,timestamp,value");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("2020-01-02,"));
        assert!(lines[1].ends_with(",100.000000"));
    }

    #[test]
    fn curve_file_names_encode_parameters() {
        let key = ScenarioKey::new(3.0, 1.0).unwrap();
        assert_eq!(curve_file_name(&key), "curve_3.00x_1.00pct.csv");
    }

    #[test]
    fn report_lists_every_scenario() {
        let md = generate_report(&sample_result());
        assert!(md.contains("# Leveraged Price Report"));
        assert!(md.contains("| 3.00X, 1.00% |"));
        assert!(md.contains("| 2.00X, 0.60% |"));
        assert!(md.contains("## Data Quality"));
        assert!(!md.contains("SYNTHETIC"));
    }
}
