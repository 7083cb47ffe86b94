//! Scenario identity and simulation output.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use super::calendar::CalendarDate;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScenarioError {
    #[error("leverage must be a finite number, got {0}")]
    InvalidLeverage(f64),

    #[error("fee must be a finite number, got {0}")]
    InvalidFee(f64),
}

/// Raw (unvalidated) scenario parameters as they appear in config files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub leverage: f64,
    pub fee: f64,
}

/// Identifies one simulation scenario: a leverage multiplier and an annual
/// fee in percent.
///
/// Both parameters are finite and `-0.0` is stored as `0.0`, so equality,
/// hashing and ordering all agree on the bit pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "ScenarioParams", into = "ScenarioParams")]
pub struct ScenarioKey {
    leverage: f64,
    fee: f64,
}

impl ScenarioKey {
    pub fn new(leverage: f64, fee: f64) -> Result<Self, ScenarioError> {
        if !leverage.is_finite() {
            return Err(ScenarioError::InvalidLeverage(leverage));
        }
        if !fee.is_finite() {
            return Err(ScenarioError::InvalidFee(fee));
        }
        Ok(Self {
            leverage: normalize_zero(leverage),
            fee: normalize_zero(fee),
        })
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    /// Annual fee in percent.
    pub fn fee(&self) -> f64 {
        self.fee
    }

    /// Chart/report label, e.g. `"3.00X, 1.00%"`.
    pub fn label(&self) -> String {
        format!("{:.2}X, {:.2}%", self.leverage, self.fee)
    }
}

fn normalize_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl TryFrom<ScenarioParams> for ScenarioKey {
    type Error = ScenarioError;

    fn try_from(p: ScenarioParams) -> Result<Self, Self::Error> {
        Self::new(p.leverage, p.fee)
    }
}

impl From<ScenarioKey> for ScenarioParams {
    fn from(k: ScenarioKey) -> Self {
        Self {
            leverage: k.leverage,
            fee: k.fee,
        }
    }
}

impl PartialEq for ScenarioKey {
    fn eq(&self, other: &Self) -> bool {
        self.leverage.to_bits() == other.leverage.to_bits() && self.fee.to_bits() == other.fee.to_bits()
    }
}

impl Eq for ScenarioKey {}

impl Hash for ScenarioKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.leverage.to_bits().hash(state);
        self.fee.to_bits().hash(state);
    }
}

impl PartialOrd for ScenarioKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScenarioKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.leverage
            .total_cmp(&other.leverage)
            .then_with(|| self.fee.total_cmp(&other.fee))
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ── Output ───────────────────────────────────────────────────────────

/// One simulated price observation.
///
/// `timestamp` is a fractional year: `year + days_passed / days_in_year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputPoint {
    pub date: CalendarDate,
    pub timestamp: f64,
    pub value: f64,
}

/// Simulated price path for one scenario, in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSeries {
    points: Vec<OutputPoint>,
}

impl OutputSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, point: OutputPoint) {
        debug_assert!(
            self.points
                .last()
                .map_or(true, |last| last.timestamp <= point.timestamp),
            "output timestamps must be non-decreasing"
        );
        self.points.push(point);
    }

    pub fn points(&self) -> &[OutputPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&OutputPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&OutputPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutputPoint> {
        self.points.iter()
    }

    /// Simulated prices only, in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// `(timestamp, value)` pairs, the shape chart widgets consume.
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.timestamp, p.value)).collect()
    }
}

impl<'a> IntoIterator for &'a OutputSeries {
    type Item = &'a OutputPoint;
    type IntoIter = std::slice::Iter<'a, OutputPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_rejects_non_finite_parameters() {
        assert!(matches!(
            ScenarioKey::new(f64::NAN, 0.0),
            Err(ScenarioError::InvalidLeverage(_))
        ));
        assert!(matches!(
            ScenarioKey::new(2.0, f64::INFINITY),
            Err(ScenarioError::InvalidFee(_))
        ));
    }

    #[test]
    fn negative_zero_fee_is_same_key() {
        let a = ScenarioKey::new(2.0, 0.0).unwrap();
        let b = ScenarioKey::new(2.0, -0.0).unwrap();
        assert_eq!(a, b);

        let set: HashSet<ScenarioKey> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn keys_order_by_leverage_then_fee() {
        let mut keys = vec![
            ScenarioKey::new(3.0, 1.0).unwrap(),
            ScenarioKey::new(0.75, 0.1).unwrap(),
            ScenarioKey::new(3.0, 0.5).unwrap(),
        ];
        keys.sort();
        let labels: Vec<String> = keys.iter().map(ScenarioKey::label).collect();
        assert_eq!(labels, vec!["0.75X, 0.10%", "3.00X, 0.50%", "3.00X, 1.00%"]);
    }

    #[test]
    fn key_deserialization_validates() {
        let ok: ScenarioKey = serde_json::from_str(r#"{"leverage":2.0,"fee":0.6}"#).unwrap();
        assert_eq!(ok.leverage(), 2.0);
        assert_eq!(ok.fee(), 0.6);

        let json = serde_json::to_string(&ok).unwrap();
        assert_eq!(json, r#"{"leverage":2.0,"fee":0.6}"#);
    }

    #[test]
    fn output_series_exposes_xy_pairs() {
        let mut series = OutputSeries::new();
        let date = CalendarDate::new(2020, 0, 2).unwrap();
        series.push(OutputPoint {
            date,
            timestamp: 2020.5,
            value: 10.0,
        });
        assert_eq!(series.xy(), vec![(2020.5, 10.0)]);
        assert_eq!(series.values().collect::<Vec<_>>(), vec![10.0]);
        assert_eq!(series.len(), 1);
    }
}
