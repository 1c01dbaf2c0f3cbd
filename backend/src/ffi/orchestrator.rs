//! PyO3 wrapper for Orchestrator
//!
//! Exposes the engine to Python as a gym-style environment.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{parse_action, parse_orchestrator_config, snapshot_to_py, step_info_to_py};
use crate::orchestrator::Orchestrator;

/// Python wrapper for the Rust engine
///
/// # Example (from Python)
///
/// ```python
/// from buffer_sim_core_rs import BufferEnv
///
/// env = BufferEnv({"num_lines": 12, "line_capacity": 10, "rng_seed": 7})
/// obs = env.reset()
/// obs, reward, terminal = env.step(0)                      # Place(0)
/// obs, reward, terminal = env.step({"type": "SendGreen"})
/// ```
#[pyclass(name = "BufferEnv")]
pub struct BufferEnv {
    inner: Orchestrator,
}

#[pymethods]
impl BufferEnv {
    /// Create a new environment from configuration
    ///
    /// # Errors
    ///
    /// Raises ValueError if a field has the wrong type or the configuration
    /// fails validation.
    #[new]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let rust_config = parse_orchestrator_config(config)?;

        let inner = Orchestrator::new(rust_config).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Failed to create environment: {}",
                e
            ))
        })?;

        Ok(BufferEnv { inner })
    }

    /// Clear every line and return the empty observation
    fn reset<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let snapshot = self.inner.reset();
        snapshot_to_py(py, &snapshot)
    }

    /// Execute one step
    ///
    /// `action` is a flat index or a dict. Returns
    /// `(observation, reward, terminal)`.
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        action: &Bound<'py, PyAny>,
    ) -> PyResult<(Bound<'py, PyDict>, f64, bool)> {
        let action = parse_action(action, self.inner.lines().num_lines())?;
        let result = self.inner.step(action).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Step failed: {}", e))
        })?;

        let observation = snapshot_to_py(py, &result.snapshot)?;
        observation.set_item("info", step_info_to_py(py, &result)?)?;
        Ok((observation, result.reward, result.terminal))
    }

    /// Size of the discrete action space
    fn num_actions(&self) -> usize {
        self.inner.num_actions()
    }

    fn current_step(&self) -> usize {
        self.inner.current_step()
    }

    fn episode(&self) -> usize {
        self.inner.episode()
    }

    /// Replace the RNG state
    fn reseed(&mut self, seed: u64) {
        self.inner.reseed(seed);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize the complete engine state to a JSON string
    fn save_state(&self) -> PyResult<String> {
        self.inner.save_state().map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Failed to save state: {}",
                e
            ))
        })
    }

    /// Restore an environment from `save_state` output
    ///
    /// Raises ValueError if `config` differs from the one that produced the
    /// checkpoint.
    #[staticmethod]
    fn load_state(config: &Bound<'_, PyDict>, state_json: &str) -> PyResult<Self> {
        let rust_config = parse_orchestrator_config(config)?;
        let inner = Orchestrator::load_state(rust_config, state_json).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Failed to load state: {}",
                e
            ))
        })?;
        Ok(BufferEnv { inner })
    }
}
