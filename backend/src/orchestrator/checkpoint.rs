//! Checkpoint - Save/Load Simulation State
//!
//! Enables serialization and deserialization of complete orchestrator state
//! for pause/resume and for branching rollouts across processes.
//!
//! # Critical Invariants
//!
//! - **Determinism**: a restored engine continues exactly like the original
//! - **Capacity**: no line in a checkpoint may exceed its capacity
//! - **Uniqueness**: no vehicle id in two lines
//! - **Config Matching**: state can only be loaded with matching config

use crate::core::time::StepClock;
use crate::models::line::{BufferLine, LineRole};
use crate::models::state::BufferLineSet;
use crate::models::vehicle::{Vehicle, VehicleId, VehicleKind};
use crate::orchestrator::engine::{Orchestrator, OrchestratorConfig, SimulationError};
use crate::rewards::EpisodeMetrics;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete orchestrator state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Step within the current episode
    pub step: usize,

    /// Episode counter
    pub episode: usize,

    /// Steps across all episodes
    pub total_steps: usize,

    /// Raw RNG state (CRITICAL for determinism)
    pub rng_state: u64,

    /// Id the next admitted vehicle receives
    pub next_vehicle_id: u64,

    pub lines: Vec<LineSnapshot>,

    pub metrics: EpisodeMetrics,

    /// SHA256 hash of the config that produced this state
    pub config_hash: String,
}

/// Line state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub capacity: usize,
    pub role: LineRole,
    pub vehicles: Vec<VehicleSnapshot>,
}

/// Vehicle state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: u64,
    pub kind: VehicleKind,
    pub waiting_time: u32,
}

impl From<&BufferLine> for LineSnapshot {
    fn from(line: &BufferLine) -> Self {
        LineSnapshot {
            capacity: line.capacity(),
            role: line.role(),
            vehicles: line
                .contents()
                .iter()
                .map(|v| VehicleSnapshot {
                    id: v.id().0,
                    kind: v.kind(),
                    waiting_time: v.waiting_time(),
                })
                .collect(),
        }
    }
}

impl LineSnapshot {
    fn into_line(self, index: usize) -> BufferLine {
        let contents = self
            .vehicles
            .into_iter()
            .map(|v| Vehicle::from_snapshot(VehicleId(v.id), v.kind, v.waiting_time))
            .collect();
        BufferLine::from_snapshot(index, self.capacity, self.role, contents)
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys, so field order in a
/// hand-written config file does not change the hash.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate snapshot against the config it is being loaded with
///
/// Checks:
/// - Config hash matches
/// - Line count and capacities agree with the config
/// - Capacity and id uniqueness (via the line set invariants)
/// - No resident id at or beyond `next_vehicle_id`
pub fn validate_snapshot(
    snapshot: &StateSnapshot,
    config: &OrchestratorConfig,
) -> Result<(), SimulationError> {
    let expected = compute_config_hash(config)?;
    if snapshot.config_hash != expected {
        return Err(SimulationError::CheckpointMismatch {
            expected,
            actual: snapshot.config_hash.clone(),
        });
    }

    let capacities = config.capacities();
    if snapshot.lines.len() != capacities.len() {
        return Err(SimulationError::InvariantViolation(format!(
            "checkpoint has {} lines, config has {}",
            snapshot.lines.len(),
            capacities.len()
        )));
    }

    for (idx, (line, capacity)) in snapshot.lines.iter().zip(&capacities).enumerate() {
        if line.capacity != *capacity {
            return Err(SimulationError::InvariantViolation(format!(
                "line {} has capacity {} in checkpoint, {} in config",
                idx, line.capacity, capacity
            )));
        }
        let role = if config.rework_line == Some(idx) {
            LineRole::Rework
        } else {
            LineRole::Standard
        };
        if line.role != role {
            return Err(SimulationError::InvariantViolation(format!(
                "line {} has role {:?} in checkpoint, {:?} in config",
                idx, line.role, role
            )));
        }
        if let Some(v) = line.vehicles.iter().find(|v| v.id >= snapshot.next_vehicle_id) {
            return Err(SimulationError::InvariantViolation(format!(
                "vehicle {} not below next_vehicle_id {}",
                VehicleId(v.id),
                snapshot.next_vehicle_id
            )));
        }
    }

    Ok(())
}

// ============================================================================
// Save / Load
// ============================================================================

impl Orchestrator {
    /// Capture the complete engine state
    pub fn checkpoint(&self) -> Result<StateSnapshot, SimulationError> {
        let clock = self.clock();
        Ok(StateSnapshot {
            step: clock.current_step(),
            episode: clock.episode(),
            total_steps: clock.total_steps(),
            rng_state: self.rng().get_state(),
            next_vehicle_id: self.next_vehicle_id(),
            lines: self.lines().lines().iter().map(LineSnapshot::from).collect(),
            metrics: self.metrics().clone(),
            config_hash: compute_config_hash(self.config())?,
        })
    }

    /// Serialize the engine state to JSON
    pub fn save_state(&self) -> Result<String, SimulationError> {
        let snapshot = self.checkpoint()?;
        serde_json::to_string(&snapshot).map_err(|e| {
            SimulationError::SerializationError(format!("Checkpoint serialization failed: {}", e))
        })
    }

    /// Rebuild an engine from a snapshot taken under `config`
    ///
    /// The event log of a restored engine starts empty.
    pub fn from_checkpoint(
        config: OrchestratorConfig,
        snapshot: StateSnapshot,
    ) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;
        validate_snapshot(&snapshot, &config)?;

        let lines: Vec<BufferLine> = snapshot
            .lines
            .into_iter()
            .enumerate()
            .map(|(idx, line)| line.into_line(idx))
            .collect();
        let lines = BufferLineSet::from_lines(lines)
            .map_err(|e| SimulationError::InvariantViolation(e.to_string()))?;

        let clock = StepClock::from_parts(snapshot.step, snapshot.episode, snapshot.total_steps);
        debug!(
            step = snapshot.step,
            episode = snapshot.episode,
            "orchestrator restored from checkpoint"
        );

        Ok(Self::from_parts(
            config,
            lines,
            snapshot.next_vehicle_id,
            RngManager::new(snapshot.rng_state),
            clock,
            snapshot.metrics,
        ))
    }

    /// Parse a JSON checkpoint and rebuild the engine
    pub fn load_state(config: OrchestratorConfig, json: &str) -> Result<Self, SimulationError> {
        let snapshot: StateSnapshot = serde_json::from_str(json).map_err(|e| {
            SimulationError::SerializationError(format!("Checkpoint parse failed: {}", e))
        })?;
        Self::from_checkpoint(config, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_config_hash_deterministic() {
        let hash1 = compute_config_hash(&OrchestratorConfig::default()).unwrap();
        let hash2 = compute_config_hash(&OrchestratorConfig::default()).unwrap();
        assert_eq!(hash1, hash2, "Same config should produce same hash");
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let config2 = OrchestratorConfig {
            rng_seed: 43,
            ..OrchestratorConfig::default()
        };

        let hash1 = compute_config_hash(&OrchestratorConfig::default()).unwrap();
        let hash2 = compute_config_hash(&config2).unwrap();

        assert_ne!(
            hash1, hash2,
            "Different configs should produce different hashes"
        );
    }

    #[test]
    fn test_validate_rejects_resident_id_beyond_counter() {
        let config = OrchestratorConfig {
            num_lines: 1,
            ..OrchestratorConfig::default()
        };
        let snapshot = StateSnapshot {
            step: 1,
            episode: 0,
            total_steps: 1,
            rng_state: 7,
            next_vehicle_id: 1,
            lines: vec![LineSnapshot {
                capacity: 10,
                role: LineRole::Standard,
                vehicles: vec![VehicleSnapshot {
                    id: 1,
                    kind: VehicleKind::Green,
                    waiting_time: 1,
                }],
            }],
            metrics: EpisodeMetrics::default(),
            config_hash: compute_config_hash(&config).unwrap(),
        };

        assert!(matches!(
            validate_snapshot(&snapshot, &config),
            Err(SimulationError::InvariantViolation(_))
        ));
    }
}
