//! Domain types for LevCalc

pub mod calendar;
pub mod scenario;

pub use calendar::{
    CalendarDate, CalendarSeries, DailyValue, MonthSeries, SeriesBuilder, SeriesError,
    SeriesPair, YearSeries, MONTHS_PER_YEAR,
};
pub use scenario::{OutputPoint, OutputSeries, ScenarioError, ScenarioKey, ScenarioParams};
