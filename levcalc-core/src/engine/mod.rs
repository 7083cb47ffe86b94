//! Simulation engine: calendar walker feeding the leverage compounder.
//!
//! The walker decides which drive-series days take part in a simulation and
//! which reference value applies to each; the compounder turns that stream
//! into a leveraged price path. The two halves are independent so the
//! gating logic can be tested without any compounding math.

pub mod compounder;
pub mod walker;

use thiserror::Error;

use crate::domain::{CalendarDate, OutputSeries, ScenarioKey, SeriesPair};

pub use compounder::{compound, LeverageCompounder};
pub use walker::{CalendarWalker, WalkState, WalkStep, WalkSummary};

/// Errors from a single scenario computation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("year {year} contributes no drive entries; daily rates are undefined")]
    DegenerateYear { year: i32 },

    #[error("drive value {value} on {date} cannot be used as a return base")]
    InvalidDriveValue { date: CalendarDate, value: f64 },
}

/// Output of one scenario plus the walker's diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub series: OutputSeries,
    pub summary: WalkSummary,
}

/// Run the walker and compounder for one scenario. Pure: no I/O, no shared state.
pub fn simulate(inputs: &SeriesPair, key: ScenarioKey) -> Result<Simulation, SimulationError> {
    let mut walker = CalendarWalker::new(&inputs.drive, &inputs.reference);
    let series = compound(key, &mut walker)?;
    tracing::debug!(
        scenario = %key,
        points = series.len(),
        carried = walker.summary().carried,
        "scenario simulated"
    );
    Ok(Simulation {
        series,
        summary: walker.summary().clone(),
    })
}
