//! Buffer Simulator Core - Rust Engine
//!
//! Discrete-step simulation of a multi-line vehicle buffer, driven by one
//! control action per step, for reinforcement-learning environments.
//!
//! # Architecture
//!
//! - **core**: Step and episode counters
//! - **models**: Domain types (Vehicle, BufferLine, BufferLineSet, Event)
//! - **arrivals**: Kind distribution and vehicle id allocation
//! - **routing**: Actions and the routing controller
//! - **rewards**: Reward table, shaping and episode metrics
//! - **orchestrator**: Episode lifecycle, step pipeline, checkpoints
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. No line ever holds more vehicles than its capacity
//! 2. All randomness is deterministic (seeded RNG)
//! 3. FFI boundary is minimal and safe

// Module declarations
pub mod arrivals;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rewards;
pub mod rng;
pub mod routing;

// Re-exports for convenience
pub use arrivals::{KindDistribution, VehicleGenerator};
pub use core::time::StepClock;
pub use models::{
    event::{Event, EventLog},
    line::{BufferLine, LineRole},
    state::{BufferLineSet, LineSetError},
    vehicle::{Vehicle, VehicleError, VehicleId, VehicleKind},
};
pub use orchestrator::{
    EnginePhase, Orchestrator, OrchestratorConfig, SimulationError, Snapshot, StateSnapshot,
    StepResult,
};
pub use rewards::{EpisodeMetrics, RewardBreakdown, RewardConfig, RewardRates, RewardShaping};
pub use rng::RngManager;
pub use routing::{Action, ActionOutcome, RoutingError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn buffer_sim_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::orchestrator::BufferEnv>()?;
    Ok(())
}
