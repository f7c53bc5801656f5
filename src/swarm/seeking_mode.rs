//! Seeking ("resting") update rule.
//!
//! 1. Fill a memory pool of SMP candidates. With self-position consideration
//!    one slot is kept for the unmodified current position.
//! 2. Move every copy around the mean best:
//!
//!    ```text
//!    mb = β·pbest + (1-β)·gbest
//!    c  = mb + β·|pbest - gbest|·ln(1/u),   u ~ U(0,1] per dimension
//!    ```
//!
//! 3. Score each candidate by its target-error norm. Faulting candidates get
//!    the sentinel error, the pool never shrinks.
//! 4. Roulette-wheel pick, weighted toward low error.

use super::best::{error_vector, l2_norm, SENTINEL};
use crate::core::config::CatConfig;
use crate::core::objective::{checked_evaluate, Objective};
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Exp1};

/// Read-only inputs for one seeking update
pub struct SeekingInput<'a> {
    pub position: &'a [f64],
    pub personal_best: &'a [f64],
    pub global_best: &'a [f64],
    pub targets: &'a [f64],
    pub cat: &'a CatConfig,
}

/// Run one seeking update and return the selected position.
pub fn seek<R: Rng + ?Sized>(
    input: &SeekingInput<'_>,
    objective: &mut dyn Objective,
    rng: &mut R,
) -> Vec<f64> {
    let pool = candidate_pool(input, rng);
    let output_size = input.targets.len();

    let norms: Vec<f64> = pool
        .iter()
        .map(|candidate| match checked_evaluate(&mut *objective, candidate, output_size) {
            Some(values) => l2_norm(&error_vector(input.targets, &values)),
            None => l2_norm(&vec![SENTINEL; output_size]),
        })
        .collect();

    let probabilities = selection_probabilities(&norms);
    let chosen = match WeightedIndex::new(&probabilities) {
        Ok(wheel) => wheel.sample(rng),
        Err(_) => rng.gen_range(0..pool.len()),
    };
    pool.into_iter()
        .nth(chosen)
        .unwrap_or_else(|| input.position.to_vec())
}

/// Build the SMP-sized candidate pool.
pub fn candidate_pool<R: Rng + ?Sized>(input: &SeekingInput<'_>, rng: &mut R) -> Vec<Vec<f64>> {
    let smp = input.cat.memory_pool;
    let copies = if input.cat.self_position {
        smp.saturating_sub(1)
    } else {
        smp
    };
    let beta = input.cat.beta;

    let mut pool: Vec<Vec<f64>> = (0..copies)
        .map(|_| {
            input
                .personal_best
                .iter()
                .zip(input.global_best)
                .map(|(p, g)| {
                    let mean_best = beta * p + (1.0 - beta) * g;
                    // ln(1/u) for u ~ U(0,1] is Exp(1)
                    let spread: f64 = Exp1.sample(rng);
                    mean_best + beta * (p - g).abs() * spread
                })
                .collect()
        })
        .collect();

    if input.cat.self_position {
        pool.push(input.position.to_vec());
    }
    pool
}

/// Roulette weights for a pool of error norms.
///
/// Uniform when every norm is identical, otherwise proportional to
/// `|norm - max| / (max - min)`, normalized to sum to 1.
pub fn selection_probabilities(norms: &[f64]) -> Vec<f64> {
    let n = norms.len();
    if n == 0 {
        return Vec::new();
    }
    if norms.iter().all(|v| *v == norms[0]) {
        return vec![1.0 / n as f64; n];
    }

    let max = norms.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = norms.iter().cloned().fold(f64::INFINITY, f64::min);
    let span = (max - min).abs();

    let raw: Vec<f64> = norms.iter().map(|v| (v - max).abs() / span).collect();
    let total: f64 = raw.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return vec![1.0 / n as f64; n];
    }
    raw.into_iter().map(|p| p / total).collect()
}
