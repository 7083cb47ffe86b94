//! LevCalc CLI: simulate leveraged price paths from two CSV series.
//!
//! Commands:
//! - `run`: compute scenarios given on the command line
//! - `batch`: compute scenarios from a TOML config file
//! - `inspect`: report per-year coverage of a single series

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use levcalc_core::data::csv_source::DEFAULT_DATE_FORMAT;
use levcalc_core::data::{load_calendar_csv, CsvOptions};
use levcalc_core::{CalendarDate, ScenarioKey};
use levcalc_runner::{
    load_inputs, parse_scenario_args, run_batch, save_artifacts, BatchResult, InputsConfig,
    LoadOptions, SimulationConfig,
};

#[derive(Parser)]
#[command(
    name = "levcalc",
    about = "LevCalc: leveraged price simulator with borrowing cost and fee drag"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute leverage/fee scenarios over a reference and a drive series.
    Run {
        /// Reference series CSV (borrowing rate, percent per year).
        reference: PathBuf,

        /// Drive series CSV (asset close).
        drive: PathBuf,

        /// Scenario pairs: LEVERAGE FEE [LEVERAGE FEE ...]. Fee is percent per year.
        #[arg(allow_negative_numbers = true, value_name = "LEVERAGE FEE")]
        scenarios: Vec<String>,

        /// chrono format of the date column.
        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        date_format: String,

        /// Generate synthetic series for missing files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Skip writing artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Compute the scenarios listed in a TOML config file.
    Batch {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Generate synthetic series for missing files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Print per-year coverage of one series.
    Inspect {
        /// Series CSV.
        file: PathBuf,

        /// chrono format of the date column.
        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        date_format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            reference,
            drive,
            scenarios,
            date_format,
            synthetic,
            output_dir,
            no_save,
        } => {
            let keys = parse_scenario_args(&scenarios)?;
            let inputs = InputsConfig {
                reference,
                drive,
                date_format,
            };
            let output = (!no_save).then_some(output_dir.as_path());
            run_scenarios(&inputs, &keys, synthetic, output)
        }
        Commands::Batch { config, synthetic } => {
            let config = SimulationConfig::from_file(&config)?;
            let keys = config.scenario_keys()?;
            let output = config.output.save.then_some(config.output.dir.as_path());
            run_scenarios(&config.inputs, &keys, synthetic, output)
        }
        Commands::Inspect { file, date_format } => run_inspect(&file, &date_format),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_scenarios(
    inputs: &InputsConfig,
    keys: &[ScenarioKey],
    synthetic: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let opts = if synthetic {
        LoadOptions::synthetic()
    } else {
        LoadOptions::default()
    };
    debug!(
        reference = %inputs.reference.display(),
        drive = %inputs.drive.display(),
        scenarios = keys.len(),
        "loading inputs"
    );
    let loaded = load_inputs(inputs, &opts)?;
    let result = run_batch(&loaded, keys)?;

    print_summary(&result);

    if result.all_empty() {
        bail!("no data to plot: the drive and reference series never share a date");
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn run_inspect(file: &Path, date_format: &str) -> Result<()> {
    let parsed = load_calendar_csv(file, &CsvOptions::with_date_format(date_format))
        .with_context(|| format!("failed to load {}", file.display()))?;
    let series = &parsed.series;

    println!("Series: {}", file.display());
    println!(
        "Rows: {} ({} duplicate date(s), later rows kept)",
        parsed.report.rows, parsed.report.duplicates
    );
    if series.is_empty() {
        println!("Series is empty.");
        return Ok(());
    }

    let mut bounds: BTreeMap<i32, (CalendarDate, CalendarDate)> = BTreeMap::new();
    for (date, _) in series.iter() {
        bounds
            .entry(date.year())
            .and_modify(|(_, last)| *last = date)
            .or_insert((date, date));
    }

    println!();
    println!(
        "{:<6} {:>6} {:>7} {:<12} {:<12}",
        "Year", "Days", "Months", "First", "Last"
    );
    println!("{}", "-".repeat(47));
    for (year, data) in series.years() {
        let Some((first, last)) = bounds.get(&year) else {
            continue;
        };
        println!(
            "{:<6} {:>6} {:>7} {:<12} {:<12}",
            year,
            data.day_count(),
            data.populated_months(),
            first.to_string(),
            last.to_string()
        );
    }
    Ok(())
}

fn print_summary(result: &BatchResult) {
    let c = &result.coverage;
    println!();
    println!("=== Leveraged Price Simulation ===");
    match c.anchor {
        Some(anchor) => println!("First day:      {anchor}"),
        None => println!("First day:      (none)"),
    }
    println!("Simulated days: {}", c.emitted);
    println!(
        "Skipped:        {} year(s), {} month(s), {} day(s) before the first match",
        c.skipped_years, c.skipped_months, c.skipped_days
    );
    println!("Carried rates:  {} day(s)", c.carried);
    println!();
    println!(
        "{:<16} {:>14} {:>10} {:>9} {:>10} {:>9}",
        "Scenario", "Final", "Return", "CAGR", "Max DD", "Vol"
    );
    println!("{}", "-".repeat(73));
    for s in &result.scenarios {
        if s.is_empty() {
            println!("{:<16} {:>14}", s.label, "no data");
            continue;
        }
        let m = &s.metrics;
        println!(
            "{:<16} {:>14.2} {:>9.2}% {:>8.2}% {:>9.2}% {:>8.2}%",
            s.label,
            m.final_value,
            m.total_return * 100.0,
            m.cagr * 100.0,
            m.max_drawdown * 100.0,
            m.annualized_volatility * 100.0
        );
    }
    if !result.warnings.is_empty() {
        println!();
    }
    for warn in &result.warnings {
        println!("WARNING: {warn}");
    }
    println!();
}
