//! Batch driver for the step/evaluate protocol.
//!
//! Interactive drivers (GUIs, plotting harnesses) call `step` and `evaluate`
//! themselves; this runner is the plain loop for everything else.

use super::error::{SwarmError, SwarmResult};
use crate::swarm::{CatSwarm, EvalOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Final state of a completed run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub iterations: u64,
    pub best_position: Vec<f64>,
    pub best_error: Vec<f64>,
    pub best_error_norm: f64,
    pub converged: bool,
    pub maxed: bool,
}

impl RunSummary {
    pub fn from_swarm(swarm: &CatSwarm) -> Self {
        RunSummary {
            iterations: swarm.iteration(),
            best_position: swarm.best_position().to_vec(),
            best_error: swarm.best_error().to_vec(),
            best_error_norm: swarm.best_error_norm(),
            converged: swarm.converged(),
            maxed: swarm.maxed(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmRunner {
    /// Log progress every N committed iterations (0 disables)
    pub report_every: u64,
    /// Consecutive objective faults tolerated on one cat before giving up
    pub max_eval_retries: usize,
}

impl Default for SwarmRunner {
    fn default() -> Self {
        SwarmRunner {
            report_every: 100,
            max_eval_retries: 100,
        }
    }
}

impl SwarmRunner {
    pub fn new(report_every: u64, max_eval_retries: usize) -> Self {
        SwarmRunner {
            report_every,
            max_eval_retries,
        }
    }

    /// Alternate `step(); evaluate(true)` until the swarm is complete.
    ///
    /// A faulting evaluation triggers boundary correction on the cursor cat
    /// and a retry.
    pub fn run(&self, swarm: &mut CatSwarm) -> SwarmResult<RunSummary> {
        let mut last_logged = 0u64;

        while !swarm.complete() {
            if swarm.active_count() == 0 {
                warn!("🚫 [Runner] Every cat is inactive, stopping");
                return Err(SwarmError::SwarmDepleted);
            }

            swarm.step()?;
            self.evaluate_with_retry(swarm)?;

            let (iteration, best) = swarm.convergence_data();
            if self.report_every > 0
                && iteration % self.report_every == 0
                && iteration != last_logged
            {
                info!("📈 [Runner] Iteration {} best eval {:.6e}", iteration, best);
                last_logged = iteration;
            }
        }

        let summary = RunSummary::from_swarm(swarm);
        info!(
            "🏁 [Runner] Finished after {} iterations: norm={:.6e} converged={} maxed={}",
            summary.iterations, summary.best_error_norm, summary.converged, summary.maxed
        );
        Ok(summary)
    }

    fn evaluate_with_retry(&self, swarm: &mut CatSwarm) -> SwarmResult<EvalOutcome> {
        let mut faults = 0usize;
        loop {
            match swarm.evaluate(true) {
                EvalOutcome::Fault => {
                    faults += 1;
                    if faults > self.max_eval_retries {
                        return Err(SwarmError::EvaluationStalled {
                            particle: swarm.current_particle(),
                            attempts: faults,
                        });
                    }
                    swarm.correct_current()?;
                }
                outcome => return Ok(outcome),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BoundaryPolicy, SwarmConfig};
    use crate::core::objective::Unconstrained;
    use crate::utils::benchmark::{coupled_pair, himmelblau, steep_exponential};

    #[test]
    fn himmelblau_run_terminates() {
        let cfg = SwarmConfig {
            particle_count: 8,
            seed: Some(2024),
            ..SwarmConfig::default()
        };
        let mut swarm = CatSwarm::new(cfg, himmelblau, Unconstrained).unwrap();
        let summary = SwarmRunner::default().run(&mut swarm).unwrap();

        assert!(summary.converged || summary.maxed);
        assert_eq!(summary.converged, summary.best_error_norm < 1e-4);
        if summary.maxed {
            assert!(summary.iterations > 10_000);
        }
        assert!(swarm.complete());
    }

    #[test]
    fn two_output_run_stops_at_iteration_cap() {
        // (a, b) = (0.5, 0.25) maps to (0.5, 0.4375)
        let cfg = SwarmConfig {
            particle_count: 10,
            lower_bounds: vec![0.0, 0.0],
            upper_bounds: vec![1.0, 1.0],
            output_size: 2,
            targets: vec![0.5, 0.4375],
            seed: Some(11),
            ..SwarmConfig::default()
        };
        let mut swarm = CatSwarm::new(cfg, coupled_pair, Unconstrained).unwrap();
        let summary = SwarmRunner::new(0, 10).run(&mut swarm).unwrap();

        assert!(summary.iterations <= 10_001);
        if !summary.converged {
            // One committed evaluation per loop pass, so the cap is hit exactly.
            assert!(summary.maxed);
            assert_eq!(summary.iterations, 10_001);
        }
    }

    #[test]
    fn initial_fault_is_corrected_and_retried() {
        let cfg = SwarmConfig {
            particle_count: 3,
            lower_bounds: vec![0.0],
            upper_bounds: vec![20.0],
            max_iterations: 30,
            seed: Some(1),
            ..SwarmConfig::default()
        };
        // Most of the box overflows; resampling finds the valid corner.
        let mut swarm = CatSwarm::new(cfg, steep_exponential, Unconstrained).unwrap();
        let summary = SwarmRunner::new(0, 1000).run(&mut swarm).unwrap();
        assert!(summary.iterations > 30 || summary.converged);
    }

    #[test]
    fn depleted_swarm_is_an_error() {
        let cfg = SwarmConfig {
            particle_count: 2,
            boundary: BoundaryPolicy::Invisible,
            seed: Some(3),
            ..SwarmConfig::default()
        };
        let mut swarm = CatSwarm::new(cfg, himmelblau, |_: &[f64]| false).unwrap();
        let err = SwarmRunner::new(0, 5).run(&mut swarm).unwrap_err();
        assert!(matches!(err, SwarmError::SwarmDepleted));
        assert_eq!(swarm.active_count(), 0);
    }

    #[test]
    fn always_faulting_objective_stalls() {
        let cfg = SwarmConfig {
            particle_count: 2,
            max_resample_attempts: 3,
            seed: Some(4),
            ..SwarmConfig::default()
        };
        let mut swarm = CatSwarm::new(cfg, |_: &[f64], _: usize| None, Unconstrained).unwrap();
        let err = SwarmRunner::new(0, 5).run(&mut swarm).unwrap_err();
        assert!(matches!(err, SwarmError::ResampleExhausted { .. }));
    }
}
