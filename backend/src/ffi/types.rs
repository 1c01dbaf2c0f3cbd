//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList, etc.)

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use serde::de::DeserializeOwned;

use crate::orchestrator::{OrchestratorConfig, Snapshot, StepResult};
use crate::routing::Action;

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract an optional field from a Python dict.
///
/// # Errors
/// Returns error only if type conversion fails (not if field is missing)
fn extract_optional<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: for<'py> FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Extract a field with a default value if missing.
///
/// # Example
/// ```ignore
/// let capacity: usize = extract_with_default(&py_dict, "line_capacity", 10)?;
/// ```
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: for<'py> FromPyObject<'py>,
{
    Ok(extract_optional(dict, key)?.unwrap_or(default))
}

/// Deserialize a nested structure by round-tripping it through Python's
/// `json` module
///
/// Used for the tagged enums (kind distribution, reward config) whose
/// field-by-field extraction would duplicate their serde definitions.
fn extract_nested<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: DeserializeOwned,
{
    let Some(value) = dict.get_item(key)? else {
        return Ok(None);
    };
    if value.is_none() {
        return Ok(None);
    }

    let json: String = dict
        .py()
        .import("json")?
        .call_method1("dumps", (value,))?
        .extract()?;

    serde_json::from_str(&json).map(Some).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Invalid field '{}': {}",
            key, e
        ))
    })
}

// ========================================================================
// Configuration Parsers
// ========================================================================

/// Convert Python dict to OrchestratorConfig
///
/// Missing keys fall back to the Rust defaults. Range checks are left to
/// `Orchestrator::new`.
pub fn parse_orchestrator_config(py_config: &Bound<'_, PyDict>) -> PyResult<OrchestratorConfig> {
    let defaults = OrchestratorConfig::default();

    Ok(OrchestratorConfig {
        num_lines: extract_with_default(py_config, "num_lines", defaults.num_lines)?,
        line_capacity: extract_with_default(py_config, "line_capacity", defaults.line_capacity)?,
        capacity_overrides: extract_with_default(
            py_config,
            "capacity_overrides",
            defaults.capacity_overrides,
        )?,
        rework_line: extract_optional(py_config, "rework_line")?,
        kind_distribution: extract_nested(py_config, "kind_distribution")?
            .unwrap_or(defaults.kind_distribution),
        other_release_age: extract_with_default(
            py_config,
            "other_release_age",
            defaults.other_release_age,
        )?,
        rng_seed: extract_with_default(py_config, "rng_seed", defaults.rng_seed)?,
        reward: extract_nested(py_config, "reward")?.unwrap_or(defaults.reward),
    })
}

/// Convert a Python action to [`Action`]
///
/// Accepts either a flat index (`int`) or a dict such as
/// `{"type": "Place", "line": 3}`.
pub fn parse_action(action: &Bound<'_, PyAny>, num_lines: usize) -> PyResult<Action> {
    if let Ok(index) = action.extract::<usize>() {
        return Action::from_index(index, num_lines)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()));
    }

    let dict: &Bound<'_, PyDict> = action.downcast()?;
    let action_type: String = dict
        .get_item("type")?
        .ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>("Missing required field 'type'")
        })?
        .extract()?;

    match action_type.as_str() {
        "Place" => {
            let line: usize = extract_optional(dict, "line")?.ok_or_else(|| {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(
                    "Place action requires field 'line'",
                )
            })?;
            Ok(Action::Place { line })
        }
        "SendGreen" => Ok(Action::SendGreen),
        "SendFaulty" => Ok(Action::SendFaulty),
        "MoveWithinBuffer" => Ok(Action::MoveWithinBuffer),
        "SendOther" => Ok(Action::SendOther),
        other => Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Unknown action type '{}'",
            other
        ))),
    }
}

// ========================================================================
// Result Converters
// ========================================================================

/// Convert Snapshot to a Python dict
///
/// `lines` is a list (one per line) of `(kind, waiting_time)` tuples,
/// head first; `features` is the flat feature vector.
pub fn snapshot_to_py<'py>(py: Python<'py>, snapshot: &Snapshot) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);

    let lines = PyList::empty(py);
    for line in snapshot.lines() {
        let entries: Vec<(&'static str, u32)> =
            line.iter().map(|(kind, wait)| (kind.as_str(), *wait)).collect();
        lines.append(PyList::new(py, entries)?)?;
    }
    dict.set_item("lines", lines)?;
    dict.set_item("features", snapshot.to_feature_vector())?;

    Ok(dict)
}

/// Convert StepResult to Python dict with the reward breakdown attached
pub fn step_info_to_py<'py>(py: Python<'py>, result: &StepResult) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("step", result.step)?;
    dict.set_item("outcome", format!("{:?}", result.outcome))?;

    let breakdown = PyDict::new(py);
    breakdown.set_item("action", result.breakdown.action)?;
    breakdown.set_item("waiting_penalty", result.breakdown.waiting_penalty)?;
    breakdown.set_item("utilization_bonus", result.breakdown.utilization_bonus)?;
    breakdown.set_item("overload_penalty", result.breakdown.overload_penalty)?;
    dict.set_item("breakdown", breakdown)?;

    Ok(dict)
}
