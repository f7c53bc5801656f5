//! Population state and its initializer.
//!
//! Struct-of-arrays layout: one entry per cat in every vector, created once at
//! construction and never resized.

use super::best::SENTINEL;
use crate::core::config::Problem;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Behavior assigned to a cat for the whole run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatMode {
    /// Resting: resample around the mean best and pick by roulette
    Seeking,
    /// Moving: pull from personal best toward global best
    Tracing,
}

/// Position of the step/evaluate protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingStep,
    AwaitingEval,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwarmState {
    pub positions: Vec<Vec<f64>>,
    pub modes: Vec<CatMode>,
    /// Cleared only by the invisible boundary policy, never set again
    pub active: Vec<bool>,
    /// Position each cat held before its latest update
    pub last_valid: Vec<Vec<f64>>,
    pub personal_best: Vec<Vec<f64>>,
    pub personal_best_error: Vec<Vec<f64>>,
    pub global_best: Vec<f64>,
    pub global_best_error: Vec<f64>,
    pub iteration: u64,
    pub cursor: usize,
    pub phase: Phase,
    /// Set by a committed evaluation, consumed by the next step
    pub allow_update: bool,
    /// |targets - values| from the last committed evaluation
    pub pending_error: Vec<f64>,
    /// Raw objective output from the last successful evaluation
    pub last_values: Vec<f64>,
    pub initial_deviation: f64,
}

impl SwarmState {
    /// Draw the initial population uniformly from the bound box.
    pub fn initialize<R: Rng + ?Sized>(
        problem: &Problem,
        particle_count: usize,
        mixture_ratio: f64,
        output_size: usize,
        rng: &mut R,
    ) -> Self {
        let dims = problem.dimensions();
        let positions: Vec<Vec<f64>> = (0..particle_count)
            .map(|_| uniform_in_box(problem, rng))
            .collect();
        let initial_deviation = absolute_mean_deviation(&positions);

        SwarmState {
            last_valid: positions.clone(),
            positions,
            modes: assign_modes(particle_count, mixture_ratio, rng),
            active: vec![true; particle_count],
            personal_best: vec![vec![SENTINEL; dims]; particle_count],
            personal_best_error: vec![vec![SENTINEL; output_size]; particle_count],
            global_best: vec![SENTINEL; dims],
            global_best_error: vec![SENTINEL; output_size],
            iteration: 0,
            cursor: 0,
            phase: Phase::AwaitingStep,
            allow_update: false,
            pending_error: Vec::new(),
            last_values: Vec::new(),
            initial_deviation,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check every per-cat array against the expected shape.
    pub fn check_shape(&self, dims: usize, output_size: usize) -> Result<(), String> {
        let n = self.positions.len();
        if n == 0 {
            return Err("population is empty".into());
        }
        let per_cat = [
            ("modes", self.modes.len()),
            ("active", self.active.len()),
            ("last_valid", self.last_valid.len()),
            ("personal_best", self.personal_best.len()),
            ("personal_best_error", self.personal_best_error.len()),
        ];
        for (name, len) in per_cat {
            if len != n {
                return Err(format!("{} has {} entries for {} cats", name, len, n));
            }
        }
        let mut rows = self
            .positions
            .iter()
            .chain(&self.last_valid)
            .chain(&self.personal_best)
            .chain(std::iter::once(&self.global_best));
        if rows.any(|row| row.len() != dims) {
            return Err(format!("a position vector does not have {} dimensions", dims));
        }
        let mut errors = self
            .personal_best_error
            .iter()
            .chain(std::iter::once(&self.global_best_error));
        if errors.any(|row| row.len() != output_size) {
            return Err(format!("a fitness vector does not have {} outputs", output_size));
        }
        if self.cursor >= n {
            return Err(format!("cursor {} out of range for {} cats", self.cursor, n));
        }
        if self.allow_update && self.pending_error.len() != output_size {
            return Err("update gate is open without a pending fitness vector".into());
        }
        Ok(())
    }
}

pub(crate) fn uniform_in_box<R: Rng + ?Sized>(problem: &Problem, rng: &mut R) -> Vec<f64> {
    problem
        .lower
        .iter()
        .zip(&problem.upper)
        .map(|(lo, hi)| lo + rng.gen::<f64>() * (hi - lo))
        .collect()
}

/// Exactly floor(ratio * n) tracing cats, randomly placed.
///
/// A lone cat is always seeking.
pub fn assign_modes<R: Rng + ?Sized>(n: usize, mixture_ratio: f64, rng: &mut R) -> Vec<CatMode> {
    if n <= 1 {
        return vec![CatMode::Seeking; n];
    }
    let tracing = ((mixture_ratio * n as f64).floor() as usize).min(n);
    let mut modes = vec![CatMode::Tracing; tracing];
    modes.resize(n, CatMode::Seeking);
    modes.shuffle(rng);
    modes
}

/// Norm of the per-dimension mean absolute deviation from the centroid.
pub fn absolute_mean_deviation(positions: &[Vec<f64>]) -> f64 {
    let Some(first) = positions.first() else {
        return 0.0;
    };
    let n = positions.len() as f64;
    let dims = first.len();

    let sum_sq: f64 = (0..dims)
        .map(|d| {
            let mean = positions.iter().map(|p| p[d]).sum::<f64>() / n;
            let mad = positions.iter().map(|p| (p[d] - mean).abs()).sum::<f64>() / n;
            mad * mad
        })
        .sum();
    sum_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn problem() -> Problem {
        Problem {
            lower: vec![0.21, 0.0, 0.1],
            upper: vec![1.0, 1.0, 0.5],
            weights: vec![2.0; 3],
            targets: vec![0.0],
        }
    }

    #[test]
    fn initial_positions_lie_in_the_box() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = problem();
        let state = SwarmState::initialize(&p, 25, 0.12, 1, &mut rng);
        assert_eq!(state.len(), 25);
        assert!(state.positions.iter().all(|x| p.in_bounds(x)));
        assert_eq!(state.last_valid, state.positions);
        assert!(state.active.iter().all(|a| *a));
        assert!(state.initial_deviation > 0.0);
        assert!(state.check_shape(3, 1).is_ok());
    }

    #[test]
    fn tracing_count_is_floor_of_ratio() {
        let mut rng = StdRng::seed_from_u64(11);
        for (n, ratio) in [(10usize, 0.2), (7, 0.5), (25, 0.02), (4, 1.0), (9, 0.0)] {
            let modes = assign_modes(n, ratio, &mut rng);
            let tracing = modes.iter().filter(|m| **m == CatMode::Tracing).count();
            assert_eq!(modes.len(), n);
            assert_eq!(tracing, (ratio * n as f64).floor() as usize, "n={} ratio={}", n, ratio);
        }
    }

    #[test]
    fn single_cat_is_always_seeking() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            assert_eq!(assign_modes(1, 1.0, &mut rng), vec![CatMode::Seeking]);
        }
    }

    #[test]
    fn deviation_of_identical_points_is_zero() {
        let pts = vec![vec![1.0, 2.0]; 4];
        assert_eq!(absolute_mean_deviation(&pts), 0.0);

        let spread = vec![vec![0.0, 0.0], vec![2.0, 0.0]];
        assert!((absolute_mean_deviation(&spread) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn check_shape_catches_truncated_arrays() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = SwarmState::initialize(&problem(), 4, 0.5, 2, &mut rng);
        state.active.pop();
        assert!(state.check_shape(3, 2).is_err());
    }
}
