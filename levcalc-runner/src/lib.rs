//! LevCalc Runner: scenario orchestration, metrics, and artifacts.
//!
//! This crate builds on `levcalc-core` to provide:
//! - Input loading with a tagged synthetic fallback
//! - TOML batch configuration and the command-line scenario-pair rule
//! - Parallel batch runs with per-scenario run ids
//! - Path metrics (total return, CAGR, drawdown, volatility)
//! - JSON / CSV / Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{
    parse_scenario_args, ConfigError, InputsConfig, OutputConfig, SimulationConfig,
};
pub use data_loader::{
    load_inputs, DataSource, InputRole, LoadError, LoadOptions, LoadedInputs, SourceInfo,
};
pub use export::{
    curve_file_name, export_curve_csv, export_json, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use metrics::PathMetrics;
pub use runner::{run_batch, BatchResult, RunError, ScenarioResult, SCHEMA_VERSION};
