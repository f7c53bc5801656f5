//! Objective and constraint seams.
//!
//! Both are user supplied and may be expensive or numerically fragile, so the
//! engine never assumes an evaluation succeeds.

/// Function being optimized.
///
/// Returns `None` when the evaluation faults (overflow, domain error, ...).
/// A fault must leave the objective usable for the next call.
pub trait Objective: Send {
    fn evaluate(&mut self, position: &[f64], output_size: usize) -> Option<Vec<f64>>;
}

impl<F> Objective for F
where
    F: FnMut(&[f64], usize) -> Option<Vec<f64>> + Send,
{
    fn evaluate(&mut self, position: &[f64], output_size: usize) -> Option<Vec<f64>> {
        self(position, output_size)
    }
}

/// Problem-specific feasibility beyond the box bounds.
pub trait Constraint: Send {
    fn admits(&self, position: &[f64]) -> bool;
}

impl<F> Constraint for F
where
    F: Fn(&[f64]) -> bool + Send,
{
    fn admits(&self, position: &[f64]) -> bool {
        self(position)
    }
}

/// Constraint that accepts every position inside the box.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unconstrained;

impl Constraint for Unconstrained {
    fn admits(&self, _position: &[f64]) -> bool {
        true
    }
}

/// Evaluate and reject malformed output.
///
/// Wrong length or any non-finite value counts as a fault, same as `None`.
pub(crate) fn checked_evaluate(
    objective: &mut dyn Objective,
    position: &[f64],
    output_size: usize,
) -> Option<Vec<f64>> {
    let values = objective.evaluate(position, output_size)?;
    if values.len() != output_size || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(values)
}
