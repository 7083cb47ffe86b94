//! Leverage compounder: daily leveraged return with borrowing and fee drag.
//!
//! For every step after the anchor:
//!
//! ```text
//! drive_return    = drive / last_drive - 1
//! leverage_return = drive_return * leverage
//!                   - (leverage - 1) * last_reference / 100 / days_in_year
//!                   - fee / 100 / days_in_year
//! output          = last_output * (1 + leverage_return)
//! ```
//!
//! The borrowing cost uses the reference value in force *before* the step;
//! the step's own reference value only takes effect from the next day. The
//! anchor step emits its drive value unchanged.

use crate::domain::{OutputPoint, OutputSeries, ScenarioKey};

use super::walker::WalkStep;
use super::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CompounderState {
    Unanchored,
    Anchored {
        last_drive: f64,
        last_output: f64,
        last_reference: f64,
    },
}

/// Running state of one scenario's compounding recurrence.
#[derive(Debug, Clone)]
pub struct LeverageCompounder {
    key: ScenarioKey,
    state: CompounderState,
}

impl LeverageCompounder {
    pub fn new(key: ScenarioKey) -> Self {
        Self {
            key,
            state: CompounderState::Unanchored,
        }
    }

    pub fn key(&self) -> ScenarioKey {
        self.key
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self.state, CompounderState::Anchored { .. })
    }

    /// Consume one step and produce its output point.
    ///
    /// The first step received is treated as the anchor.
    pub fn step(&mut self, step: &WalkStep) -> Result<OutputPoint, SimulationError> {
        if step.days_in_year == 0 {
            return Err(SimulationError::DegenerateYear {
                year: step.date.year(),
            });
        }

        let value = match self.state {
            CompounderState::Unanchored => step.drive,
            CompounderState::Anchored {
                last_drive,
                last_output,
                last_reference,
            } => {
                if last_drive == 0.0 || !last_drive.is_finite() {
                    return Err(SimulationError::InvalidDriveValue {
                        date: step.date,
                        value: last_drive,
                    });
                }
                let leverage = self.key.leverage();
                let days = step.days_in_year as f64;

                let drive_return = step.drive / last_drive - 1.0;
                let leverage_return = drive_return * leverage
                    - (leverage - 1.0) * last_reference / 100.0 / days
                    - self.key.fee() / 100.0 / days;

                last_output * (1.0 + leverage_return)
            }
        };

        self.state = CompounderState::Anchored {
            last_drive: step.drive,
            last_output: value,
            last_reference: step.reference,
        };

        Ok(OutputPoint {
            date: step.date,
            timestamp: step.timestamp,
            value,
        })
    }
}

/// Run a full step stream through a fresh compounder.
pub fn compound<I>(key: ScenarioKey, steps: I) -> Result<OutputSeries, SimulationError>
where
    I: IntoIterator<Item = WalkStep>,
{
    let steps = steps.into_iter();
    let mut series = OutputSeries::with_capacity(steps.size_hint().0);
    let mut compounder = LeverageCompounder::new(key);
    for step in steps {
        series.push(compounder.step(&step)?);
    }
    Ok(series)
}
