use super::error::{SwarmError, SwarmResult};
use anyhow::Context;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Strategy applied when a particle leaves the admissible region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum BoundaryPolicy {
    /// Resample uniformly inside the box until admissible.
    #[default]
    Random,
    /// Revert to the last valid position; resample if the constraint fails.
    Reflecting,
    /// Same handling as `Reflecting`.
    Absorbing,
    /// Permanently deactivate the particle.
    Invisible,
}

impl TryFrom<u8> for BoundaryPolicy {
    type Error = SwarmError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(BoundaryPolicy::Random),
            2 => Ok(BoundaryPolicy::Reflecting),
            3 => Ok(BoundaryPolicy::Absorbing),
            4 => Ok(BoundaryPolicy::Invisible),
            other => Err(SwarmError::UnknownBoundary(other)),
        }
    }
}

impl From<BoundaryPolicy> for u8 {
    fn from(policy: BoundaryPolicy) -> u8 {
        match policy {
            BoundaryPolicy::Random => 1,
            BoundaryPolicy::Reflecting => 2,
            BoundaryPolicy::Absorbing => 3,
            BoundaryPolicy::Invisible => 4,
        }
    }
}

/// Cat-specific hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatConfig {
    /// Fraction of the population in tracing mode (MR)
    pub mixture_ratio: f64,
    /// Seeking memory pool: candidates generated per seeking update (SMP)
    #[serde(deserialize_with = "whole_number")]
    pub memory_pool: usize,
    /// Seeking range of the selected dimension (SRD). Carried, not used by the update rule.
    pub seeking_range: f64,
    /// Counts of dimension to change (CDC). Carried, not used by the update rule.
    #[serde(deserialize_with = "whole_number")]
    pub dimension_change_count: usize,
    /// Self-position consideration (SPC): keep the current position in the pool
    pub self_position: bool,
    /// Influence of personal best versus global best
    pub beta: f64,
}

impl Default for CatConfig {
    fn default() -> Self {
        CatConfig {
            mixture_ratio: 0.12,
            memory_pool: 5,
            seeking_range: 0.2,
            dimension_change_count: 2,
            self_position: false,
            beta: 0.5,
        }
    }
}

/// Main configuration for a cat swarm run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub particle_count: usize,
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
    /// Tracing-mode weights, one per dimension or a single broadcast value
    pub weights: Vec<f64>,
    pub output_size: usize,
    pub targets: Vec<f64>,
    pub tolerance: f64,
    pub max_iterations: u64,
    pub boundary: BoundaryPolicy,
    pub cat: CatConfig,
    /// Retry budget for the random boundary policy
    pub max_resample_attempts: usize,
    /// Emit a diagnostic through the reporter on every step
    pub verbose: bool,
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        SwarmConfig {
            particle_count: 8,
            lower_bounds: vec![-5.0, -5.0],
            upper_bounds: vec![5.0, 5.0],
            weights: vec![2.0],
            output_size: 1,
            targets: vec![0.0],
            tolerance: 1e-4,
            max_iterations: 10_000,
            boundary: BoundaryPolicy::Random,
            cat: CatConfig::default(),
            max_resample_attempts: 10_000,
            verbose: false,
            seed: None,
        }
    }
}

/// Validated, normalized view of a [`SwarmConfig`].
///
/// `weights` is always expanded to one entry per dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub weights: Vec<f64>,
    pub targets: Vec<f64>,
}

impl Problem {
    pub fn dimensions(&self) -> usize {
        self.lower.len()
    }

    pub fn in_bounds(&self, position: &[f64]) -> bool {
        position
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .all(|(x, (lo, hi))| lo <= x && x <= hi)
    }
}

impl SwarmConfig {
    /// Bounds and targets for a problem, every other field at its default.
    pub fn new(lower_bounds: Vec<f64>, upper_bounds: Vec<f64>, targets: Vec<f64>) -> Self {
        SwarmConfig {
            output_size: targets.len(),
            lower_bounds,
            upper_bounds,
            targets,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> SwarmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading swarm config {}", path.display()))?;
        let config = Self::from_json_str(&raw)
            .with_context(|| format!("parsing swarm config {}", path.display()))?;
        Ok(config)
    }

    pub fn to_json(&self) -> SwarmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every option and return the normalized problem.
    pub fn validate(&self) -> SwarmResult<Problem> {
        let (lower, upper) = (&self.lower_bounds, &self.upper_bounds);
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(SwarmError::BoundShape {
                lower: lower.len(),
                upper: upper.len(),
            });
        }
        for (dim, (&lo, &hi)) in lower.iter().zip(upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(SwarmError::InvertedBound {
                    dim,
                    lower: lo,
                    upper: hi,
                });
            }
        }

        let dims = lower.len();
        let weights = match self.weights.len() {
            1 => vec![self.weights[0]; dims],
            n if n == dims => self.weights.clone(),
            n => {
                return Err(invalid(format!(
                    "weights must have 1 or {} entries, got {}",
                    dims, n
                )))
            }
        };

        if self.output_size == 0 {
            return Err(invalid("output_size must be at least 1".into()));
        }
        if self.targets.len() != self.output_size {
            return Err(invalid(format!(
                "targets must have output_size={} entries, got {}",
                self.output_size,
                self.targets.len()
            )));
        }
        if self.particle_count == 0 {
            return Err(invalid("particle_count must be at least 1".into()));
        }
        if !(self.tolerance > 0.0) {
            return Err(invalid(format!("tolerance must be > 0, got {}", self.tolerance)));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.cat.mixture_ratio) {
            return Err(invalid(format!(
                "mixture_ratio must be in [0, 1], got {}",
                self.cat.mixture_ratio
            )));
        }
        if self.cat.memory_pool == 0 {
            return Err(invalid("memory_pool must be at least 1".into()));
        }
        if self.max_resample_attempts == 0 {
            return Err(invalid("max_resample_attempts must be at least 1".into()));
        }

        Ok(Problem {
            lower: lower.clone(),
            upper: upper.clone(),
            weights,
            targets: self.targets.clone(),
        })
    }
}

/// Accepts `2` as well as `2.0`.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(de::Error::custom(format!(
            "expected a non-negative whole number, got {}",
            value
        )))
    }
}

fn invalid(msg: String) -> SwarmError {
    SwarmError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_dim() -> SwarmConfig {
        SwarmConfig::new(vec![0.21, 0.0, 0.1], vec![1.0, 1.0, 0.5], vec![0.0, 0.0])
    }

    #[test]
    fn boundary_selector_round_trips_through_u8() {
        for selector in 1u8..=4 {
            let policy = BoundaryPolicy::try_from(selector).unwrap();
            assert_eq!(u8::from(policy), selector);
        }
        assert!(matches!(
            BoundaryPolicy::try_from(7),
            Err(SwarmError::UnknownBoundary(7))
        ));
    }

    #[test]
    fn unknown_selector_in_json_is_rejected() {
        let mut value = serde_json::to_value(three_dim()).unwrap();
        value["boundary"] = serde_json::json!(9);
        assert!(serde_json::from_value::<SwarmConfig>(value).is_err());
    }

    #[test]
    fn weights_broadcast_to_every_dimension() {
        let problem = three_dim().validate().unwrap();
        assert_eq!(problem.weights, vec![2.0, 2.0, 2.0]);
        assert_eq!(problem.dimensions(), 3);
    }

    #[test]
    fn mismatched_bounds_are_a_shape_error() {
        let mut cfg = three_dim();
        cfg.upper_bounds.pop();
        assert!(matches!(
            cfg.validate(),
            Err(SwarmError::BoundShape { lower: 3, upper: 2 })
        ));

        let empty = SwarmConfig::new(vec![], vec![], vec![0.0]);
        assert!(matches!(empty.validate(), Err(SwarmError::BoundShape { .. })));
    }

    #[test]
    fn inverted_bound_names_the_dimension() {
        let mut cfg = three_dim();
        cfg.lower_bounds[1] = 2.0;
        match cfg.validate() {
            Err(SwarmError::InvertedBound { dim, .. }) => assert_eq!(dim, 1),
            other => panic!("expected InvertedBound, got {:?}", other),
        }
    }

    #[test]
    fn scalar_options_are_checked() {
        let mut cfg = three_dim();
        cfg.tolerance = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = three_dim();
        cfg.cat.mixture_ratio = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = three_dim();
        cfg.targets.push(1.0);
        assert!(cfg.validate().is_err());

        let mut cfg = three_dim();
        cfg.weights = vec![1.0, 2.0];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = SwarmConfig::from_json_str(
            r#"{"particle_count": 25, "lower_bounds": [0.0], "upper_bounds": [1.0], "boundary": 4}"#,
        )
        .unwrap();
        assert_eq!(cfg.particle_count, 25);
        assert_eq!(cfg.boundary, BoundaryPolicy::Invisible);
        assert_eq!(cfg.cat, CatConfig::default());
        assert_eq!(cfg.max_iterations, 10_000);
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = SwarmConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("reading swarm config"));
    }

    #[test]
    fn from_file_reads_written_config() {
        let path = std::env::temp_dir().join(format!("catswarm-config-{}.json", std::process::id()));
        std::fs::write(&path, three_dim().to_json().unwrap()).unwrap();
        let loaded = SwarmConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, three_dim());
    }

    #[test]
    fn integral_floats_are_accepted_for_counts() {
        let json = r#"{"cat": {"memory_pool": 7.0, "dimension_change_count": 2.0}}"#;
        let cfg = SwarmConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.cat.memory_pool, 7);
        assert_eq!(cfg.cat.dimension_change_count, 2);

        let json = r#"{"cat": {"dimension_change_count": 3}}"#;
        assert_eq!(SwarmConfig::from_json_str(json).unwrap().cat.dimension_change_count, 3);

        assert!(SwarmConfig::from_json_str(r#"{"cat": {"memory_pool": 2.5}}"#).is_err());
        assert!(SwarmConfig::from_json_str(r#"{"cat": {"memory_pool": -1}}"#).is_err());
    }
}
