use thiserror::Error;

/// Result type for swarm operations
pub type SwarmResult<T> = Result<T, SwarmError>;

/// Errors raised by the swarm engine.
///
/// Configuration errors are fatal: the engine is never constructed.
/// Evaluation faults from the objective are not errors at all, they are
/// reported as [`crate::swarm::EvalOutcome::Fault`].
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("lower and upper bounds must be non-empty 1xD vectors of the same length (got {lower} and {upper})")]
    BoundShape { lower: usize, upper: usize },

    #[error("bounds in dimension {dim} are invalid: lower={lower}, upper={upper}")]
    InvertedBound { dim: usize, lower: f64, upper: f64 },

    #[error("no boundary is set: selector {0} is not one of 1=random, 2=reflecting, 3=absorbing, 4=invisible")]
    UnknownBoundary(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("particle {particle}: no admissible position found after {attempts} resampling attempts")]
    ResampleExhausted { particle: usize, attempts: usize },

    #[error("snapshot rejected: {0}")]
    Snapshot(String),

    #[error("objective failed {attempts} consecutive times on particle {particle}")]
    EvaluationStalled { particle: usize, attempts: usize },

    #[error("every particle has been deactivated")]
    SwarmDepleted,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SwarmError {
    /// Whether this error means the engine could not be built at all.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            SwarmError::BoundShape { .. }
                | SwarmError::InvertedBound { .. }
                | SwarmError::UnknownBoundary(_)
                | SwarmError::InvalidConfig(_)
        )
    }
}
