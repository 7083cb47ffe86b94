//! Sparse calendar series: one daily value per (year, month, day).
//!
//! Layout: `year → [12 months] → sparse days`. Years and days are sparse
//! (absence means "no data", never zero); the month dimension is always
//! fully allocated so every year has exactly twelve slots.
//!
//! Series are assembled once through [`SeriesBuilder`] and are read-only
//! afterwards.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap};
use std::fmt;
use thiserror::Error;

/// Number of month slots in every [`YearSeries`].
pub const MONTHS_PER_YEAR: usize = 12;

/// Errors raised while assembling a calendar series.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeriesError {
    #[error("month index {0} out of range (expected 0..=11)")]
    MonthOutOfRange(u8),

    #[error("day {0} out of range (expected 1..=31)")]
    DayOutOfRange(u8),

    #[error("non-finite value {value} on {date}")]
    NonFiniteValue { date: CalendarDate, value: f64 },
}

// ── CalendarDate ─────────────────────────────────────────────────────

/// Composite key of a calendar series: year, zero-based month, day of month.
///
/// Ordering is chronological (year, then month, then day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    year: i32,
    month0: u8,
    day: u8,
}

impl CalendarDate {
    /// Build a date from a year, a zero-based month (January = 0) and a day (1–31).
    ///
    /// Only the ranges are checked; 31 February is a valid key, just never
    /// produced by the CSV parser.
    pub fn new(year: i32, month0: u8, day: u8) -> Result<Self, SeriesError> {
        if month0 as usize >= MONTHS_PER_YEAR {
            return Err(SeriesError::MonthOutOfRange(month0));
        }
        if !(1..=31).contains(&day) {
            return Err(SeriesError::DayOutOfRange(day));
        }
        Ok(Self { year, month0, day })
    }

    /// Construct from parts already known to be in range (map keys of a built series).
    pub(crate) fn from_parts(year: i32, month0: u8, day: u8) -> Self {
        Self { year, month0, day }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month index (January = 0).
    pub fn month0(&self) -> u8 {
        self.month0
    }

    /// One-based month number (January = 1).
    pub fn month(&self) -> u32 {
        self.month0 as u32 + 1
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Convert to a `NaiveDate`, or `None` for keys like 31 February.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month(), self.day as u32)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0() as u8,
            day: date.day() as u8,
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month(), self.day)
    }
}

// ── Series levels ────────────────────────────────────────────────────

/// Value recorded for one calendar day (close price or rate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub close: f64,
}

impl DailyValue {
    pub fn new(close: f64) -> Self {
        Self { close }
    }
}

/// Sparse day-of-month → value map for a single month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthSeries {
    days: BTreeMap<u8, DailyValue>,
}

impl MonthSeries {
    pub fn get(&self, day: u8) -> Option<&DailyValue> {
        self.days.get(&day)
    }

    pub fn contains(&self, day: u8) -> bool {
        self.days.contains_key(&day)
    }

    /// Number of days with data in this month.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days with data, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &DailyValue)> + '_ {
        self.days.iter().map(|(&day, value)| (day, value))
    }

    pub(crate) fn entries(&self) -> btree_map::Iter<'_, u8, DailyValue> {
        self.days.iter()
    }

    fn insert(&mut self, day: u8, value: DailyValue) -> Option<DailyValue> {
        self.days.insert(day, value)
    }
}

/// Exactly twelve month slots (index 0 = January), allocated even when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSeries {
    months: [MonthSeries; MONTHS_PER_YEAR],
}

impl YearSeries {
    /// Month slot by zero-based index. Panics if `month0 >= 12`.
    pub fn month(&self, month0: u8) -> &MonthSeries {
        &self.months[month0 as usize]
    }

    /// All twelve month slots in calendar order.
    pub fn months(&self) -> &[MonthSeries; MONTHS_PER_YEAR] {
        &self.months
    }

    /// Total number of day entries across all twelve months.
    pub fn day_count(&self) -> usize {
        self.months.iter().map(MonthSeries::len).sum()
    }

    /// Number of months holding at least one day.
    pub fn populated_months(&self) -> usize {
        self.months.iter().filter(|m| !m.is_empty()).count()
    }
}

/// Sparse year → [`YearSeries`] map, iterated in ascending year order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarSeries {
    years: BTreeMap<i32, YearSeries>,
}

impl CalendarSeries {
    /// An empty series.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(&self, year: i32) -> Option<&YearSeries> {
        self.years.get(&year)
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }

    /// Month slot for `(year, month0)`, or `None` when the year is absent.
    pub fn month(&self, year: i32, month0: u8) -> Option<&MonthSeries> {
        self.years
            .get(&year)
            .and_then(|y| y.months.get(month0 as usize))
    }

    /// Value recorded for an exact date.
    pub fn get(&self, date: CalendarDate) -> Option<&DailyValue> {
        self.month(date.year, date.month0)
            .and_then(|m| m.get(date.day))
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.get(date).is_some()
    }

    /// Years present, ascending.
    pub fn years(&self) -> impl Iterator<Item = (i32, &YearSeries)> + '_ {
        self.years.iter().map(|(&year, series)| (year, series))
    }

    pub(crate) fn year_entries(&self) -> btree_map::Iter<'_, i32, YearSeries> {
        self.years.iter()
    }

    /// Every (date, value) pair in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (CalendarDate, &DailyValue)> + '_ {
        self.years.iter().flat_map(|(&year, ys)| {
            ys.months.iter().enumerate().flat_map(move |(m, month)| {
                month
                    .days
                    .iter()
                    .map(move |(&day, v)| (CalendarDate::from_parts(year, m as u8, day), v))
            })
        })
    }

    /// Total number of day entries.
    pub fn len(&self) -> usize {
        self.years.values().map(YearSeries::day_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_date(&self) -> Option<CalendarDate> {
        self.iter().next().map(|(date, _)| date)
    }

    pub fn last_date(&self) -> Option<CalendarDate> {
        let (&year, ys) = self.years.iter().rev().find(|(_, ys)| ys.day_count() > 0)?;
        ys.months
            .iter()
            .enumerate()
            .rev()
            .find_map(|(m, month)| {
                month
                    .days
                    .keys()
                    .next_back()
                    .map(|&day| CalendarDate::from_parts(year, m as u8, day))
            })
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// Accumulates daily values and freezes them into a [`CalendarSeries`].
///
/// Inserting a date twice keeps the later value; the number of overwritten
/// entries is reported by [`SeriesBuilder::duplicates`].
#[derive(Debug, Default)]
pub struct SeriesBuilder {
    series: CalendarSeries,
    duplicates: usize,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `date`. Returns the value it replaced, if any.
    pub fn insert(
        &mut self,
        date: CalendarDate,
        value: DailyValue,
    ) -> Result<Option<DailyValue>, SeriesError> {
        if !value.close.is_finite() {
            return Err(SeriesError::NonFiniteValue {
                date,
                value: value.close,
            });
        }
        let replaced = self
            .series
            .years
            .entry(date.year)
            .or_default()
            .months[date.month0 as usize]
            .insert(date.day, value);
        if replaced.is_some() {
            self.duplicates += 1;
        }
        Ok(replaced)
    }

    /// Convenience for `insert(NaiveDate, close)`.
    pub fn insert_close(
        &mut self,
        date: NaiveDate,
        close: f64,
    ) -> Result<Option<DailyValue>, SeriesError> {
        self.insert(CalendarDate::from(date), DailyValue::new(close))
    }

    /// Number of inserts that overwrote an existing date.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn build(self) -> CalendarSeries {
        self.series
    }
}

// ── SeriesPair ───────────────────────────────────────────────────────

/// The two inputs of every simulation: the drive series (asset close) and
/// the reference series (borrowing rate, percent per year).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPair {
    pub drive: CalendarSeries,
    pub reference: CalendarSeries,
}

impl SeriesPair {
    pub fn new(drive: CalendarSeries, reference: CalendarSeries) -> Self {
        Self { drive, reference }
    }
}
