//! Orchestrator - episode lifecycle and step pipeline
//!
//! See `engine.rs` for the step loop and `checkpoint.rs` for save/load.

pub mod checkpoint;
pub mod engine;
pub mod snapshot;

// Re-export main types for convenience
pub use engine::{EnginePhase, Orchestrator, OrchestratorConfig, SimulationError, StepResult};
pub use snapshot::Snapshot;

// Re-export checkpoint types
pub use checkpoint::{compute_config_hash, LineSnapshot, StateSnapshot, VehicleSnapshot};
