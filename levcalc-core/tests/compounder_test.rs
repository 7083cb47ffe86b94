//! End-to-end compounding through `simulate` and the scenario cache.

use chrono::NaiveDate;
use levcalc_core::{
    simulate, CalendarDate, CalendarSeries, ScenarioCache, ScenarioKey, SeriesBuilder, SeriesPair,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn series(points: &[(NaiveDate, f64)]) -> CalendarSeries {
    let mut b = SeriesBuilder::new();
    for &(date, v) in points {
        b.insert_close(date, v).unwrap();
    }
    b.build()
}

fn key(leverage: f64, fee: f64) -> ScenarioKey {
    ScenarioKey::new(leverage, fee).unwrap()
}

fn three_day_pair() -> SeriesPair {
    let drive = series(&[
        (ymd(2020, 1, 2), 100.0),
        (ymd(2020, 1, 3), 102.0),
        (ymd(2020, 1, 4), 101.0),
    ]);
    let reference = series(&[(ymd(2020, 1, 2), 5.0), (ymd(2020, 1, 3), 5.0)]);
    SeriesPair::new(drive, reference)
}

#[test]
fn two_x_leverage_over_three_days() {
    let sim = simulate(&three_day_pair(), key(2.0, 0.0)).unwrap();
    let values: Vec<f64> = sim.series.values().collect();
    assert_eq!(values.len(), 3);

    assert_eq!(values[0], 100.0);

    let day2 = 100.0 * (1.0 + 0.02 * 2.0 - 5.0 / 100.0 / 3.0);
    assert!((values[1] - day2).abs() < 1e-9);
    assert!((values[1] - 102.333).abs() < 1e-3);

    let day3 = day2 * (1.0 + (101.0 / 102.0 - 1.0) * 2.0 - 5.0 / 100.0 / 3.0);
    assert!((values[2] - day3).abs() < 1e-9);
    assert!((values[2] - 98.62).abs() < 1e-2);

    assert_eq!(sim.summary.carried, 1, "January 4 reuses the January 3 rate");
}

#[test]
fn unleveraged_zero_fee_tracks_the_drive_series() {
    let drive_points: Vec<(NaiveDate, f64)> = (0..200)
        .map(|i| {
            let d = ymd(2019, 1, 1) + chrono::Duration::days(i * 3);
            (d, 50.0 + (i as f64 * 0.37).sin() * 8.0)
        })
        .collect();
    let reference_points: Vec<(NaiveDate, f64)> =
        drive_points.iter().step_by(4).map(|&(d, _)| (d, 2.5)).collect();
    let pair = SeriesPair::new(series(&drive_points), series(&reference_points));

    let sim = simulate(&pair, key(1.0, 0.0)).unwrap();
    assert_eq!(sim.series.len(), drive_points.len());
    for point in sim.series.iter() {
        let drive = pair.drive.get(point.date).unwrap().close;
        assert!(
            (point.value - drive).abs() <= 1e-9 * drive.abs(),
            "{}: {} vs {}",
            point.date,
            point.value,
            drive
        );
    }
}

#[test]
fn first_point_is_the_anchor_drive_value() {
    let drive = series(&[
        (ymd(2020, 1, 2), 90.0),
        (ymd(2020, 1, 3), 91.0),
        (ymd(2020, 1, 6), 95.0),
        (ymd(2020, 1, 7), 97.0),
    ]);
    let reference = series(&[(ymd(2020, 1, 6), 3.0)]);
    let pair = SeriesPair::new(drive, reference);

    let sim = simulate(&pair, key(3.0, 1.0)).unwrap();
    let first = sim.series.first().unwrap();
    assert_eq!(first.date, CalendarDate::from(ymd(2020, 1, 6)));
    assert_eq!(first.value, 95.0);
    assert_eq!(sim.series.len(), 2);
}

#[test]
fn fee_only_drags_a_flat_series() {
    let drive: Vec<(NaiveDate, f64)> = (1..=10).map(|d| (ymd(2020, 3, d), 100.0)).collect();
    let reference: Vec<(NaiveDate, f64)> = (1..=10).map(|d| (ymd(2020, 3, d), 0.0)).collect();
    let pair = SeriesPair::new(series(&drive), series(&reference));

    let sim = simulate(&pair, key(1.0, 10.0)).unwrap();
    let expected_last = 100.0 * (1.0 - 10.0 / 100.0 / 10.0_f64).powi(9);
    let last = sim.series.last().unwrap().value;
    assert!((last - expected_last).abs() < 1e-9);
    assert!(sim.series.values().collect::<Vec<_>>().windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn cache_results_match_direct_simulation() {
    let pair = three_day_pair();
    let mut cache = ScenarioCache::new(pair.clone());
    cache.compute(3.0, 1.0).unwrap();
    cache.compute(2.0, 0.6).unwrap();

    for (leverage, fee) in [(3.0, 1.0), (2.0, 0.6)] {
        let direct = simulate(&pair, key(leverage, fee)).unwrap().series;
        assert_eq!(cache.get(leverage, fee), Some(&direct));
    }
    assert!(cache.get(1.0, 0.2).is_none());
}
