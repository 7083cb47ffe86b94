//! Path metrics: pure functions over a simulated price path.
//!
//! Every metric is a pure function: output series in, scalar out. Time is
//! measured with the series' fractional-year timestamps, so gaps in the
//! drive calendar do not distort annualisation.

use serde::{Deserialize, Serialize};

use levcalc_core::OutputSeries;

/// Summary statistics for one scenario path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub annualized_volatility: f64,
    pub final_value: f64,
    pub years: f64,
}

impl PathMetrics {
    pub fn compute(series: &OutputSeries) -> Self {
        Self {
            total_return: total_return(series),
            cagr: cagr(series),
            max_drawdown: max_drawdown(series),
            annualized_volatility: annualized_volatility(series),
            final_value: final_value(series),
            years: years(series),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Last value of the path, 0.0 when empty.
pub fn final_value(series: &OutputSeries) -> f64 {
    series.last().map_or(0.0, |p| p.value)
}

/// Fractional years between the first and last point.
pub fn years(series: &OutputSeries) -> f64 {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp).max(0.0),
        _ => 0.0,
    }
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(series: &OutputSeries) -> f64 {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return 0.0;
    };
    if series.len() < 2 || first.value <= 0.0 {
        return 0.0;
    }
    (last.value - first.value) / first.value
}

/// Compound annual growth rate over the timestamp span.
///
/// Returns 0.0 for spans shorter than a day's worth of a year or for paths
/// that end at or below zero.
pub fn cagr(series: &OutputSeries) -> f64 {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return 0.0;
    };
    let span = years(series);
    if span < 1.0 / 366.0 || first.value <= 0.0 || last.value <= 0.0 {
        return 0.0;
    }
    (last.value / first.value).powf(1.0 / span) - 1.0
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// A path that crosses zero reports a drawdown of -1.0 or below.
pub fn max_drawdown(series: &OutputSeries) -> f64 {
    let mut values = series.values();
    let Some(mut peak) = values.next() else {
        return 0.0;
    };
    let mut max_dd = 0.0_f64;

    for v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (v - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualised volatility of per-point log returns.
///
/// The scaling factor is the observed number of points per year, so the
/// metric adapts to whatever calendar the drive series uses. Returns 0.0
/// with fewer than three points or when any value is non-positive.
pub fn annualized_volatility(series: &OutputSeries) -> f64 {
    let values: Vec<f64> = series.values().collect();
    if values.len() < 3 || values.iter().any(|v| *v <= 0.0) {
        return 0.0;
    }
    let span = years(series);
    if span <= 0.0 {
        return 0.0;
    }

    let returns: Vec<f64> = values.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let points_per_year = n / span;
    var.sqrt() * points_per_year.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use levcalc_core::{simulate, ScenarioKey, SeriesBuilder, SeriesPair};

    /// Simulated 1x/0% path over `closes`, one point per weekday of 2020
    /// starting January 2nd, with a flat reference series.
    fn path(closes: &[f64]) -> OutputSeries {
        let mut drive = SeriesBuilder::new();
        let mut reference = SeriesBuilder::new();
        let mut date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        for &c in closes {
            drive.insert_close(date, c).unwrap();
            reference.insert_close(date, 0.0).unwrap();
            date += chrono::Duration::days(1);
        }
        let pair = SeriesPair::new(drive.build(), reference.build());
        simulate(&pair, ScenarioKey::new(1.0, 0.0).unwrap()).unwrap().series
    }

    #[test]
    fn empty_path_has_zero_metrics() {
        let m = PathMetrics::compute(&OutputSeries::new());
        assert_eq!(m, PathMetrics::default());
    }

    #[test]
    fn total_return_and_final_value() {
        let p = path(&[100.0, 110.0, 120.0]);
        assert!((total_return(&p) - 0.2).abs() < 1e-12);
        assert!((final_value(&p) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_from_peak() {
        let p = path(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert!((max_drawdown(&p) - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn monotonic_path_has_no_drawdown() {
        let p = path(&[100.0, 101.0, 102.0, 103.0]);
        assert_eq!(max_drawdown(&p), 0.0);
    }

    #[test]
    fn years_follow_timestamps() {
        let p = path(&[100.0; 10]);
        let first = p.first().unwrap().timestamp;
        let last = p.last().unwrap().timestamp;
        assert!((years(&p) - (last - first)).abs() < 1e-15);
        assert!(years(&p) > 0.0 && years(&p) < 1.0);
    }

    #[test]
    fn cagr_of_flat_path_is_zero() {
        let p = path(&[100.0; 30]);
        assert!(cagr(&p).abs() < 1e-12);
    }

    #[test]
    fn cagr_matches_growth_over_span() {
        let p = path(&[100.0, 105.0, 110.0]);
        let span = years(&p);
        let expected = (110.0_f64 / 100.0).powf(1.0 / span) - 1.0;
        assert!((cagr(&p) - expected).abs() < 1e-9);
    }

    #[test]
    fn constant_growth_has_zero_volatility() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let p = path(&closes);
        assert!(annualized_volatility(&p) < 1e-9);
    }

    #[test]
    fn volatility_positive_for_choppy_path() {
        let p = path(&[100.0, 104.0, 98.0, 103.0, 97.0, 102.0]);
        assert!(annualized_volatility(&p) > 0.0);
    }
}
