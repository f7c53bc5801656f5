//! Personal/global best bookkeeping and the termination predicates.

use super::state::SwarmState;

/// Stand-in for "no fitness recorded yet". Finite, so it survives JSON.
pub const SENTINEL: f64 = i64::MAX as f64;

/// Euclidean norm, scaled so large error vectors do not overflow.
pub fn l2_norm(v: &[f64]) -> f64 {
    let scale = v.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale * v.iter().map(|x| (x / scale).powi(2)).sum::<f64>().sqrt()
}

/// Element-wise |targets - values|
pub fn error_vector(targets: &[f64], values: &[f64]) -> Vec<f64> {
    targets
        .iter()
        .zip(values)
        .map(|(t, v)| (t - v).abs())
        .collect()
}

/// Which bests a committed evaluation replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BestUpdate {
    pub global: bool,
    pub personal: bool,
}

impl SwarmState {
    /// Compare `error` against the global and personal bests of `particle`.
    ///
    /// Strictly smaller norm wins; ties keep the existing best.
    pub fn record_best(&mut self, particle: usize, error: &[f64]) -> BestUpdate {
        let norm = l2_norm(error);
        let mut update = BestUpdate::default();

        if norm < l2_norm(&self.global_best_error) {
            self.global_best_error = error.to_vec();
            self.global_best = self.positions[particle].clone();
            update.global = true;
        }
        if norm < l2_norm(&self.personal_best_error[particle]) {
            self.personal_best_error[particle] = error.to_vec();
            self.personal_best[particle] = self.positions[particle].clone();
            update.personal = true;
        }
        update
    }

    pub fn best_error_norm(&self) -> f64 {
        l2_norm(&self.global_best_error)
    }
}

/// Termination rule: converged or out of iterations, nothing else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvergenceCriteria {
    pub tolerance: f64,
    pub max_iterations: u64,
}

impl ConvergenceCriteria {
    pub fn converged(&self, state: &SwarmState) -> bool {
        state.best_error_norm() < self.tolerance
    }

    pub fn maxed(&self, state: &SwarmState) -> bool {
        state.iteration > self.max_iterations
    }

    pub fn complete(&self, state: &SwarmState) -> bool {
        self.converged(state) || self.maxed(state)
    }
}
