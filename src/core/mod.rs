//! Configuration, errors and the seams the swarm engine depends on.

pub mod config;
pub mod error;
pub mod objective;
pub mod reporter;
pub mod runner;

pub use config::{BoundaryPolicy, CatConfig, Problem, SwarmConfig};
pub use error::{SwarmError, SwarmResult};
pub use objective::{Constraint, Objective, Unconstrained};
pub use reporter::{RecordingReporter, Reporter, Severity, TracingReporter};
pub use runner::{RunSummary, SwarmRunner};
