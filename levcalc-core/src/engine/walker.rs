//! Calendar walker: lock-step iteration of the drive and reference series.
//!
//! The walker visits drive-series days in calendar order and yields the ones
//! eligible for simulation. Eligibility follows a two-state policy:
//!
//! - `Seeking`: nothing has matched yet. A drive year is skipped when the
//!   reference has no entry for that year, a month is skipped when the
//!   reference has no entries for that (year, month), and a day is skipped
//!   when the reference lacks that exact date.
//! - `Tracking`: the first fully matched day (the anchor) has been emitted.
//!   No gate applies any more; days without a reference entry reuse the last
//!   observed reference value.
//!
//! Each year's `days_in_year` is the number of drive entries in that year,
//! fixed before its first day is visited. Months skipped while seeking do
//! not advance `days_passed`; skipped days inside an included month do.

use std::collections::btree_map;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::{
    CalendarDate, CalendarSeries, DailyValue, SeriesPair, YearSeries, MONTHS_PER_YEAR,
};

/// Inclusion state of the walker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkState {
    /// No day has matched the reference series yet.
    Seeking,
    /// Anchored; `carried` is the most recently observed reference value.
    Tracking { carried: f64 },
}

/// One eligible drive day, paired with the reference value that applies to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkStep {
    pub date: CalendarDate,
    /// `year + days_passed / days_in_year`.
    pub timestamp: f64,
    /// Drive entries in this step's year.
    pub days_in_year: usize,
    pub drive: f64,
    pub reference: f64,
    /// True when `reference` was observed on this exact date, false when carried.
    pub reference_fresh: bool,
    /// True for the first emitted step only.
    pub anchor: bool,
}

/// Counters describing what the walker skipped and carried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkSummary {
    /// Drive years skipped before the anchor (no reference data that year).
    pub skipped_years: usize,
    /// Drive months skipped before the anchor (no reference data that month).
    pub skipped_months: usize,
    /// Drive days skipped before the anchor (no reference value that day).
    pub skipped_days: usize,
    /// Included years with zero drive entries; skipped without computing.
    pub degenerate_years: Vec<i32>,
    /// Steps emitted, anchor included.
    pub emitted: usize,
    /// Emitted steps that reused a carried reference value.
    pub carried: usize,
    /// First emitted date.
    pub anchor: Option<CalendarDate>,
}

/// Cursor over the drive days of one included year.
struct YearCursor<'a> {
    year: i32,
    series: &'a YearSeries,
    days_in_year: usize,
    days_passed: usize,
    next_month: usize,
    month0: u8,
    days: Option<btree_map::Iter<'a, u8, DailyValue>>,
}

impl<'a> YearCursor<'a> {
    fn new(year: i32, series: &'a YearSeries, days_in_year: usize) -> Self {
        Self {
            year,
            series,
            days_in_year,
            days_passed: 0,
            next_month: 0,
            month0: 0,
            days: None,
        }
    }

    /// Next drive day of this year, applying the month gate while `seeking`.
    ///
    /// Every returned day has already been counted in `days_passed`.
    fn next_day(
        &mut self,
        reference: &CalendarSeries,
        seeking: bool,
        summary: &mut WalkSummary,
    ) -> Option<(CalendarDate, f64)> {
        loop {
            if let Some(days) = self.days.as_mut() {
                if let Some((&day, value)) = days.next() {
                    self.days_passed += 1;
                    let date = CalendarDate::from_parts(self.year, self.month0, day);
                    return Some((date, value.close));
                }
                self.days = None;
            }

            if self.next_month >= MONTHS_PER_YEAR {
                return None;
            }
            let month0 = self.next_month as u8;
            self.next_month += 1;

            let month = self.series.month(month0);
            if month.is_empty() {
                continue;
            }
            let reference_empty = reference
                .month(self.year, month0)
                .map_or(true, |m| m.is_empty());
            if seeking && reference_empty {
                trace!(year = self.year, month = month0 + 1, "no reference data for month, skipping");
                summary.skipped_months += 1;
                continue;
            }

            self.month0 = month0;
            self.days = Some(month.entries());
        }
    }

    fn timestamp(&self) -> f64 {
        self.year as f64 + self.days_passed as f64 / self.days_in_year as f64
    }
}

/// Lazy, finite, non-restartable iterator of [`WalkStep`]s.
pub struct CalendarWalker<'a> {
    reference: &'a CalendarSeries,
    years: btree_map::Iter<'a, i32, YearSeries>,
    cursor: Option<YearCursor<'a>>,
    state: WalkState,
    summary: WalkSummary,
}

impl<'a> CalendarWalker<'a> {
    pub fn new(drive: &'a CalendarSeries, reference: &'a CalendarSeries) -> Self {
        Self {
            reference,
            years: drive.year_entries(),
            cursor: None,
            state: WalkState::Seeking,
            summary: WalkSummary::default(),
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Diagnostics so far; complete once the iterator is exhausted.
    pub fn summary(&self) -> &WalkSummary {
        &self.summary
    }

    /// Drain the walker and return only its diagnostics.
    pub fn into_summary(mut self) -> WalkSummary {
        for _ in self.by_ref() {}
        self.summary
    }

    /// Year gate and degenerate-year check. `None` means the year is skipped.
    fn enter_year(&mut self, year: i32, series: &'a YearSeries) -> Option<YearCursor<'a>> {
        if self.state == WalkState::Seeking && !self.reference.has_year(year) {
            debug!(year, "no reference data for year, skipping");
            self.summary.skipped_years += 1;
            return None;
        }

        let days_in_year = series.day_count();
        if days_in_year == 0 {
            debug!(year, "year has no drive entries, skipping");
            self.summary.degenerate_years.push(year);
            return None;
        }

        Some(YearCursor::new(year, series, days_in_year))
    }
}

impl<'a> Iterator for CalendarWalker<'a> {
    type Item = WalkStep;

    fn next(&mut self) -> Option<WalkStep> {
        loop {
            if self.cursor.is_none() {
                let (&year, series) = self.years.next()?;
                self.cursor = self.enter_year(year, series);
                continue;
            }
            let Some(cursor) = self.cursor.as_mut() else {
                continue;
            };

            let seeking = self.state == WalkState::Seeking;
            let Some((date, drive)) = cursor.next_day(self.reference, seeking, &mut self.summary)
            else {
                self.cursor = None;
                continue;
            };
            let timestamp = cursor.timestamp();
            let days_in_year = cursor.days_in_year;
            let observed = self.reference.get(date).map(|v| v.close);

            let (reference, reference_fresh, anchor) = match (self.state, observed) {
                (WalkState::Seeking, None) => {
                    self.summary.skipped_days += 1;
                    continue;
                }
                (WalkState::Seeking, Some(rate)) => {
                    debug!(%date, drive, rate, "anchor found, tracking");
                    self.summary.anchor = Some(date);
                    (rate, true, true)
                }
                (WalkState::Tracking { .. }, Some(rate)) => (rate, true, false),
                (WalkState::Tracking { carried }, None) => {
                    self.summary.carried += 1;
                    (carried, false, false)
                }
            };

            self.state = WalkState::Tracking { carried: reference };
            self.summary.emitted += 1;

            return Some(WalkStep {
                date,
                timestamp,
                days_in_year,
                drive,
                reference,
                reference_fresh,
                anchor,
            });
        }
    }
}

impl SeriesPair {
    /// Walk the drive series against the reference series.
    pub fn walk(&self) -> CalendarWalker<'_> {
        CalendarWalker::new(&self.drive, &self.reference)
    }
}
