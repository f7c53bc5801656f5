//! Benchmark objectives and constraints.
//!
//! Objectives follow the engine convention: `None` signals an evaluation
//! fault rather than a panic.

/// Himmelblau's function, 2 inputs, 1 output.
///
/// Four global minima with value 0, e.g. (3, 2) and (-2.805118, 3.131312).
pub fn himmelblau(x: &[f64], _output_size: usize) -> Option<Vec<f64>> {
    let (a, b) = (*x.first()?, *x.get(1)?);
    let f = (a * a + b - 11.0).powi(2) + (a + b * b - 7.0).powi(2);
    f.is_finite().then(|| vec![f])
}

/// Sum of squares over every input, 1 output.
pub fn sphere(x: &[f64], _output_size: usize) -> Option<Vec<f64>> {
    let f: f64 = x.iter().map(|v| v * v).sum();
    f.is_finite().then(|| vec![f])
}

/// Two coupled outputs from two inputs: `(a² + b, a - b²)`.
///
/// Any target of the form `(a² + b, a - b²)` is reachable exactly.
pub fn coupled_pair(x: &[f64], _output_size: usize) -> Option<Vec<f64>> {
    let (a, b) = (*x.first()?, *x.get(1)?);
    Some(vec![a * a + b, a - b * b])
}

/// Exponential that overflows for large inputs and reports a fault.
pub fn steep_exponential(x: &[f64], _output_size: usize) -> Option<Vec<f64>> {
    let f: f64 = x.iter().map(|v| (v * 50.0).exp()).sum();
    f.is_finite().then(|| vec![f])
}

/// Three-variable feasibility slab: `0.1 <= x2 <= x0 / 2`.
pub fn slab_constraint(x: &[f64]) -> bool {
    match (x.first(), x.get(2)) {
        (Some(x0), Some(x2)) => *x2 <= *x0 / 2.0 && *x2 >= 0.1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn himmelblau_minima_are_zero() {
        assert!(himmelblau(&[3.0, 2.0], 1).unwrap()[0].abs() < 1e-12);
        assert!(himmelblau(&[-2.805118, 3.131312], 1).unwrap()[0] < 1e-9);
        assert_eq!(himmelblau(&[0.0, 0.0], 1), Some(vec![170.0]));
        assert_eq!(himmelblau(&[1.0], 1), None);
    }

    #[test]
    fn steep_exponential_faults_on_overflow() {
        assert!(steep_exponential(&[0.1], 1).is_some());
        assert_eq!(steep_exponential(&[20.0], 1), None);
    }

    #[test]
    fn slab_constraint_matches_definition() {
        assert!(slab_constraint(&[0.5, 0.0, 0.2]));
        assert!(!slab_constraint(&[0.3, 0.0, 0.2]));
        assert!(!slab_constraint(&[1.0, 0.0, 0.05]));
        assert!(!slab_constraint(&[1.0]));
    }

    #[test]
    fn coupled_pair_and_sphere() {
        assert_eq!(coupled_pair(&[1.0, 2.0], 2), Some(vec![3.0, -3.0]));
        assert_eq!(sphere(&[3.0, 4.0], 1), Some(vec![25.0]));
    }
}
