//! LevCalc Core: calendar series, calendar walker, leverage compounder, scenario cache.
//!
//! This crate contains the simulation engine for synthetically leveraged
//! instruments:
//! - Sparse calendar series (year → 12 months → sparse days)
//! - CSV series parser producing calendar series
//! - Calendar walker with the Seeking/Tracking inclusion policy
//! - Leverage compounder (borrowing-cost drag + fee drag, compounded daily)
//! - Scenario cache keyed by (leverage, fee)
//! - Dataset and run fingerprints

pub mod cache;
pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;

pub use cache::{CacheError, ScenarioCache};
pub use domain::{
    CalendarDate, CalendarSeries, DailyValue, MonthSeries, OutputPoint, OutputSeries,
    ScenarioError, ScenarioKey, ScenarioParams, SeriesBuilder, SeriesError, SeriesPair,
    YearSeries,
};
pub use engine::{
    simulate, CalendarWalker, LeverageCompounder, Simulation, SimulationError, WalkState,
    WalkStep, WalkSummary,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: inputs, keys and outputs can cross threads.
    ///
    /// `ScenarioCache::compute_batch` shares the input series across the rayon
    /// pool, so these must stay Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<CalendarSeries>();
        require_sync::<CalendarSeries>();
        require_send::<SeriesPair>();
        require_sync::<SeriesPair>();
        require_send::<ScenarioKey>();
        require_sync::<ScenarioKey>();
        require_send::<OutputSeries>();
        require_sync::<OutputSeries>();
        require_send::<ScenarioCache>();
        require_sync::<ScenarioCache>();
        require_send::<WalkSummary>();
        require_sync::<WalkSummary>();
        require_send::<SimulationError>();
        require_sync::<SimulationError>();
    }

    /// The walker borrows its inputs; it must not outlive them or own them.
    #[test]
    fn walker_borrows_series_pair() {
        let pair = SeriesPair::new(CalendarSeries::new(), CalendarSeries::new());
        let mut walker = pair.walk();
        assert!(walker.next().is_none());
        assert_eq!(walker.state(), WalkState::Seeking);
    }
}
