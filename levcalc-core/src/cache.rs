//! Scenario cache: one simulated price path per (leverage, fee).
//!
//! The cache owns its input series and is a plain value owned by the caller.
//! Every `compute` is a full recomputation that replaces the stored path; a
//! lookup for a scenario that was never computed returns `None`, which is
//! distinct from a computed scenario whose path is empty.

use std::collections::HashMap;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{OutputSeries, ScenarioError, ScenarioKey, SeriesPair};
use crate::engine::{simulate, SimulationError, WalkSummary};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("scenario {key}: {source}")]
    Simulation {
        key: ScenarioKey,
        #[source]
        source: SimulationError,
    },
}

/// Result store keyed by [`ScenarioKey`].
#[derive(Debug, Clone)]
pub struct ScenarioCache {
    inputs: SeriesPair,
    entries: HashMap<ScenarioKey, OutputSeries>,
}

impl ScenarioCache {
    pub fn new(inputs: SeriesPair) -> Self {
        Self {
            inputs,
            entries: HashMap::new(),
        }
    }

    /// The drive and reference series every scenario is computed from.
    pub fn inputs(&self) -> &SeriesPair {
        &self.inputs
    }

    /// Compute the scenario from scratch and store it, replacing any previous path.
    pub fn compute(&mut self, leverage: f64, fee: f64) -> Result<&OutputSeries, CacheError> {
        let key = ScenarioKey::new(leverage, fee)?;
        self.compute_key(key)
    }

    pub fn compute_key(&mut self, key: ScenarioKey) -> Result<&OutputSeries, CacheError> {
        let simulation = simulate(&self.inputs, key)
            .map_err(|source| CacheError::Simulation { key, source })?;
        debug!(scenario = %key, points = simulation.series.len(), "scenario stored");
        self.entries.insert(key, simulation.series);
        Ok(&self.entries[&key])
    }

    /// Compute several scenarios in parallel and store each under its key.
    ///
    /// The inputs are shared read-only across the pool; results are written
    /// back on the calling thread. Every successful scenario is stored; the
    /// first failure in `keys` order is returned.
    pub fn compute_batch(&mut self, keys: &[ScenarioKey]) -> Result<(), CacheError> {
        let inputs = &self.inputs;
        let results: Vec<(ScenarioKey, Result<OutputSeries, SimulationError>)> = keys
            .par_iter()
            .map(|&key| (key, simulate(inputs, key).map(|s| s.series)))
            .collect();

        let mut first_error = None;
        for (key, result) in results {
            match result {
                Ok(series) => {
                    self.entries.insert(key, series);
                }
                Err(source) => {
                    first_error.get_or_insert(CacheError::Simulation { key, source });
                }
            }
        }
        info!(scenarios = keys.len(), stored = self.entries.len(), "batch computed");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Stored path for the scenario, or `None` if it was never computed.
    pub fn get(&self, leverage: f64, fee: f64) -> Option<&OutputSeries> {
        let key = ScenarioKey::new(leverage, fee).ok()?;
        self.entries.get(&key)
    }

    pub fn get_key(&self, key: &ScenarioKey) -> Option<&OutputSeries> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ScenarioKey) -> bool {
        self.entries.contains_key(key)
    }

    /// All stored scenarios, in no particular order.
    pub fn all(&self) -> impl Iterator<Item = (&ScenarioKey, &OutputSeries)> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walker diagnostics for the inputs. Identical for every scenario.
    pub fn coverage(&self) -> WalkSummary {
        self.inputs.walk().into_summary()
    }
}
