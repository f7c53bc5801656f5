//! Tracing ("moving") update rule.
//!
//! No velocity is carried between iterations:
//!
//! ```text
//! x' = pbest + w ⊙ u ⊙ (gbest - pbest),   u ~ U[0,1) per dimension
//! ```

use rand::Rng;

pub fn trace<R: Rng + ?Sized>(
    personal_best: &[f64],
    global_best: &[f64],
    weights: &[f64],
    rng: &mut R,
) -> Vec<f64> {
    personal_best
        .iter()
        .zip(global_best)
        .zip(weights)
        .map(|((p, g), w)| p + w * rng.gen::<f64>() * (g - p))
        .collect()
}
