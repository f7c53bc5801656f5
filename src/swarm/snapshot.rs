//! Flat key/value snapshot of a running swarm.
//!
//! Everything except the objective, constraint, reporter and RNG is captured;
//! those are supplied again on import.

use super::engine::{criteria_for, rng_for, CatSwarm};
use super::state::SwarmState;
use crate::core::config::{Problem, SwarmConfig};
use crate::core::error::{SwarmError, SwarmResult};
use crate::core::objective::{Constraint, Objective};
use crate::core::reporter::{Reporter, Severity, TracingReporter};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwarmSnapshot {
    #[serde(flatten)]
    pub config: SwarmConfig,
    #[serde(flatten)]
    pub state: SwarmState,
}

impl SwarmSnapshot {
    pub fn to_json(&self) -> SwarmResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SwarmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl CatSwarm {
    pub fn export(&self) -> SwarmSnapshot {
        SwarmSnapshot {
            config: self.config.clone(),
            state: self.state.clone(),
        }
    }

    /// Rebuild a swarm from a snapshot.
    ///
    /// The RNG is seeded from the snapshot's `seed` (entropy when unset), so
    /// call [`CatSwarm::reseed`] to control the continuation.
    pub fn from_snapshot(
        snapshot: SwarmSnapshot,
        objective: impl Objective + 'static,
        constraint: impl Constraint + 'static,
    ) -> SwarmResult<Self> {
        let rng = rng_for(snapshot.config.seed);
        Self::from_snapshot_with_parts(snapshot, objective, constraint, TracingReporter, rng)
    }

    /// Rebuild a swarm from a snapshot with an explicit reporter and random
    /// source. A rejected snapshot is reported once as `Severity::Fatal`.
    pub fn from_snapshot_with_parts(
        snapshot: SwarmSnapshot,
        objective: impl Objective + 'static,
        constraint: impl Constraint + 'static,
        reporter: impl Reporter + 'static,
        rng: StdRng,
    ) -> SwarmResult<Self> {
        let problem = match checked_problem(&snapshot) {
            Ok(problem) => problem,
            Err(e) => {
                reporter.report(Severity::Fatal, &e.to_string());
                return Err(e);
            }
        };

        info!(
            "📥 [CatSwarm] Restored {} cats at iteration {}",
            snapshot.state.len(),
            snapshot.state.iteration
        );
        Ok(CatSwarm {
            criteria: criteria_for(&snapshot.config),
            rng,
            config: snapshot.config,
            problem,
            state: snapshot.state,
            objective: Box::new(objective),
            constraint: Box::new(constraint),
            reporter: Box::new(reporter),
        })
    }

    /// Replace this swarm's state in place, keeping constraint, reporter and
    /// RNG. On a rejected snapshot the swarm is left untouched.
    pub fn restore(
        &mut self,
        snapshot: SwarmSnapshot,
        objective: impl Objective + 'static,
    ) -> SwarmResult<()> {
        let problem = match checked_problem(&snapshot) {
            Ok(problem) => problem,
            Err(e) => {
                self.reporter.report(Severity::Fatal, &e.to_string());
                return Err(e);
            }
        };

        self.criteria = criteria_for(&snapshot.config);
        self.problem = problem;
        self.config = snapshot.config;
        self.state = snapshot.state;
        self.objective = Box::new(objective);
        Ok(())
    }
}

fn checked_problem(snapshot: &SwarmSnapshot) -> SwarmResult<Problem> {
    let problem = snapshot.config.validate()?;
    check_snapshot(snapshot)?;
    Ok(problem)
}

fn check_snapshot(snapshot: &SwarmSnapshot) -> SwarmResult<()> {
    let config = &snapshot.config;
    if snapshot.state.len() != config.particle_count {
        return Err(SwarmError::Snapshot(format!(
            "{} positions for particle_count={}",
            snapshot.state.len(),
            config.particle_count
        )));
    }
    snapshot
        .state
        .check_shape(config.lower_bounds.len(), config.output_size)
        .map_err(SwarmError::Snapshot)
}
