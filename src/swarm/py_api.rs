use super::engine::CatSwarm;
use super::snapshot::SwarmSnapshot;
use crate::core::config::SwarmConfig;
use crate::core::error::SwarmError;
use crate::core::objective::{Constraint, Objective, Unconstrained};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use tracing::debug;

/// Python callable `(position, output_size) -> (values, ok)`.
struct PyObjective(Py<PyAny>);

impl Objective for PyObjective {
    fn evaluate(&mut self, position: &[f64], output_size: usize) -> Option<Vec<f64>> {
        Python::with_gil(|py| {
            let result = self
                .0
                .call1(py, (position.to_vec(), output_size))
                .and_then(|r| r.extract::<(Vec<f64>, bool)>(py));
            match result {
                Ok((values, ok)) => ok.then_some(values),
                Err(e) => {
                    debug!("🐍 [PyCatSwarm] Objective raised: {}", e);
                    None
                }
            }
        })
    }
}

/// Python callable `(position) -> bool`.
struct PyConstraint(Py<PyAny>);

impl Constraint for PyConstraint {
    fn admits(&self, position: &[f64]) -> bool {
        Python::with_gil(|py| {
            self.0
                .call1(py, (position.to_vec(),))
                .and_then(|r| r.extract::<bool>(py))
                .unwrap_or(false)
        })
    }
}

fn to_py_err(err: SwarmError) -> PyErr {
    if err.is_fatal_config() {
        PyValueError::new_err(err.to_string())
    } else {
        PyRuntimeError::new_err(err.to_string())
    }
}

#[pyclass(name = "CatSwarm")]
pub struct PyCatSwarm {
    engine: CatSwarm,
    constraint: Option<Py<PyAny>>,
}

#[pymethods]
impl PyCatSwarm {
    /// Build a swarm from a JSON configuration string.
    #[new]
    #[pyo3(signature = (config_json, objective, constraint=None))]
    pub fn new(
        config_json: &str,
        objective: Py<PyAny>,
        constraint: Option<Py<PyAny>>,
    ) -> PyResult<Self> {
        let config = SwarmConfig::from_json_str(config_json).map_err(to_py_err)?;
        let engine = match &constraint {
            Some(c) => CatSwarm::new(config, PyObjective(objective), PyConstraint(c.clone())),
            None => CatSwarm::new(config, PyObjective(objective), Unconstrained),
        }
        .map_err(to_py_err)?;
        Ok(Self { engine, constraint })
    }

    pub fn step(&mut self) -> PyResult<()> {
        self.engine.step().map(|_| ()).map_err(to_py_err)
    }

    /// Evaluate the current cat; returns `False` on an objective fault.
    #[pyo3(signature = (allow_update=true))]
    pub fn call_objective(&mut self, allow_update: bool) -> bool {
        self.engine.evaluate(allow_update).is_success()
    }

    /// Apply the boundary policy to the current cat after a fault.
    pub fn correct_current(&mut self) -> PyResult<()> {
        self.engine.correct_current().map(|_| ()).map_err(to_py_err)
    }

    pub fn complete(&self) -> bool {
        self.engine.complete()
    }

    pub fn converged(&self) -> bool {
        self.engine.converged()
    }

    pub fn maxed(&self) -> bool {
        self.engine.maxed()
    }

    pub fn get_obj_inputs(&self) -> Vec<f64> {
        self.engine.current_position().to_vec()
    }

    pub fn get_convergence_data(&self) -> (u64, f64) {
        self.engine.convergence_data()
    }

    pub fn get_optimized_soln(&self) -> Vec<f64> {
        self.engine.best_position().to_vec()
    }

    pub fn get_optimized_outs(&self) -> Vec<f64> {
        self.engine.best_error().to_vec()
    }

    pub fn absolute_mean_deviation(&self) -> f64 {
        self.engine.absolute_mean_deviation()
    }

    pub fn export_swarm(&self) -> PyResult<String> {
        self.engine.export().to_json().map_err(to_py_err)
    }

    /// Replace the swarm with an exported one; the constraint is kept.
    pub fn import_swarm(&mut self, snapshot_json: &str, objective: Py<PyAny>) -> PyResult<()> {
        let snapshot = SwarmSnapshot::from_json(snapshot_json).map_err(to_py_err)?;
        self.engine = match &self.constraint {
            Some(c) => CatSwarm::from_snapshot(
                snapshot,
                PyObjective(objective),
                PyConstraint(c.clone()),
            ),
            None => CatSwarm::from_snapshot(snapshot, PyObjective(objective), Unconstrained),
        }
        .map_err(to_py_err)?;
        Ok(())
    }

    pub fn reseed(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }
}
