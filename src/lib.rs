//! CatSwarm Core - Cat Swarm Optimization engine
//!
//! A population-based optimizer for box-bounded, optionally constrained
//! problems whose objective is supplied by the caller. The engine is driven
//! one cat at a time (`step`, then `evaluate`) so that slow or external
//! objectives can be interleaved with GUIs, plotting and checkpoints.
// Python bindings live behind the `python` feature.

pub mod core;
pub mod swarm;
pub mod utils;

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub use crate::core::config::{BoundaryPolicy, CatConfig, SwarmConfig};
pub use crate::core::error::{SwarmError, SwarmResult};
pub use crate::core::objective::{Constraint, Objective, Unconstrained};
pub use crate::core::reporter::{RecordingReporter, Reporter, Severity, TracingReporter};
pub use crate::core::runner::{RunSummary, SwarmRunner};
pub use crate::swarm::{CatSwarm, EvalOutcome, Phase, StepOutcome, SwarmSnapshot};

/// Initialize tracing for the library. Safe to call more than once.
#[cfg_attr(feature = "python", pyfunction)]
#[cfg_attr(feature = "python", pyo3(signature = (level=None)))]
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Python module initialization
#[cfg(feature = "python")]
#[pymodule]
fn catswarm_core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<swarm::py_api::PyCatSwarm>()?;
    m.add_function(wrap_pyfunction!(setup_logging, m)?)?;
    Ok(())
}
