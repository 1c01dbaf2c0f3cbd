//! Python bindings (PyO3)

pub mod orchestrator;
pub mod types;
