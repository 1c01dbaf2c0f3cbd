//! Orchestrator Engine
//!
//! Main simulation loop integrating all components:
//! - Routing (one control action per step)
//! - Aging (every survivor waits one more step)
//! - Reward accounting (flat action reward plus optional shaping)
//! - Event logging (complete episode history)
//!
//! # Architecture
//!
//! ```text
//! For each step:
//! 1. Validate the action (an unknown line fails before any mutation)
//! 2. Apply the action to the line set
//! 3. Age every resident by one
//! 4. Check capacity and uniqueness invariants
//! 5. Compute the reward from the post-aging state
//! 6. Update episode metrics and log events
//! 7. Produce the snapshot and decide terminality
//! ```
//!
//! # Phases
//!
//! ```text
//!          reset()              step()
//!   ──────► Ready ────────────► Running ◄──┐
//!             ▲                  │   │     │ step() (non-empty)
//!             │ reset()          │   └─────┘
//!             └──────────────── Terminal ──► Running (step repopulates)
//! ```
//!
//! Terminality is recomputed after every step from the current contents,
//! so stepping a terminal engine is allowed.
//!
//! # Example
//!
//! ```rust
//! use buffer_sim_core_rs::orchestrator::{Orchestrator, OrchestratorConfig};
//! use buffer_sim_core_rs::routing::Action;
//!
//! let mut engine = Orchestrator::new(OrchestratorConfig::default()).unwrap();
//! let snapshot = engine.reset();
//! assert!(snapshot.is_empty());
//!
//! let result = engine.step(Action::Place { line: 0 }).unwrap();
//! assert_eq!(result.reward, 1.0);
//! assert!(!result.terminal);
//! ```

use crate::arrivals::{KindDistribution, VehicleGenerator};
use crate::core::time::StepClock;
use crate::models::event::{Event, EventLog};
use crate::models::state::BufferLineSet;
use crate::orchestrator::snapshot::Snapshot;
use crate::rewards::{compute_reward, EpisodeMetrics, RewardBreakdown, RewardConfig};
use crate::rng::RngManager;
use crate::routing::{apply_action, Action, ActionOutcome, RoutingError, RoutingRules};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete orchestrator configuration
///
/// Every field has a serde default, so `{}` is a valid JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Number of parallel buffer lines
    pub num_lines: usize,

    /// Capacity of every line without an override
    pub line_capacity: usize,

    /// Per-line capacity overrides as `(line, capacity)`
    pub capacity_overrides: Vec<(usize, usize)>,

    /// Line reserved for Faulty vehicles, if any
    pub rework_line: Option<usize>,

    /// Kind distribution for newly placed vehicles
    pub kind_distribution: KindDistribution,

    /// Minimum waiting time before `SendOther` releases an Other vehicle
    pub other_release_age: u32,

    /// RNG seed for deterministic simulation
    pub rng_seed: u64,

    /// Reward table and optional shaping
    pub reward: RewardConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            num_lines: 12,
            line_capacity: 10,
            capacity_overrides: Vec::new(),
            rework_line: None,
            kind_distribution: KindDistribution::default(),
            other_release_age: 5,
            rng_seed: 42,
            reward: RewardConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Effective per-line capacities after overrides
    ///
    /// Out-of-range overrides are skipped; `validate_config` reports them.
    pub fn capacities(&self) -> Vec<usize> {
        let mut capacities = vec![self.line_capacity; self.num_lines];
        for &(line, capacity) in &self.capacity_overrides {
            if let Some(slot) = capacities.get_mut(line) {
                *slot = capacity;
            }
        }
        capacities
    }

    fn routing_rules(&self) -> RoutingRules {
        RoutingRules {
            other_release_age: self.other_release_age,
        }
    }
}

// ============================================================================
// Results and Errors
// ============================================================================

/// Engine lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    /// Freshly reset, no step taken yet
    Ready,
    /// At least one vehicle resident after the last step
    Running,
    /// Every line empty after the last step
    Terminal,
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    /// Step number within the episode (1-based)
    pub step: usize,

    /// State after the action and aging
    pub snapshot: Snapshot,

    /// Scalar reward (`breakdown.total()`)
    pub reward: f64,

    /// Reward split by source
    pub breakdown: RewardBreakdown,

    /// All lines empty
    pub terminal: bool,

    pub phase: EnginePhase,

    /// What the action did
    pub outcome: ActionOutcome,
}

/// Simulation errors
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Checkpoint config mismatch: expected {expected}, got {actual}")]
    CheckpointMismatch { expected: String, actual: String },
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Buffer simulation engine
///
/// Owns the line set, the RNG and the vehicle generator; nothing is shared.
/// Cloning yields an independent engine that continues identically, which
/// planners use to branch rollouts.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    lines: BufferLineSet,
    generator: VehicleGenerator,
    rng: RngManager,
    clock: StepClock,
    rules: RoutingRules,
    event_log: EventLog,
    metrics: EpisodeMetrics,
    phase: EnginePhase,
}

impl Orchestrator {
    /// Create a new engine in the `Ready` phase with empty lines
    pub fn new(config: OrchestratorConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let lines = BufferLineSet::new(&config.capacities(), config.rework_line);
        let generator = VehicleGenerator::new(config.kind_distribution.clone());
        let rng = RngManager::new(config.rng_seed);
        let rules = config.routing_rules();

        debug!(
            num_lines = config.num_lines,
            rng_seed = config.rng_seed,
            shaping = config.reward.shaping.is_some(),
            "orchestrator created"
        );

        Ok(Self {
            config,
            lines,
            generator,
            rng,
            clock: StepClock::new(),
            rules,
            event_log: EventLog::new(),
            metrics: EpisodeMetrics::new(),
            phase: EnginePhase::Ready,
        })
    }

    /// Validate configuration
    pub fn validate_config(config: &OrchestratorConfig) -> Result<(), SimulationError> {
        if config.num_lines == 0 {
            return Err(SimulationError::InvalidConfig(
                "num_lines must be > 0".to_string(),
            ));
        }

        if config.line_capacity == 0 {
            return Err(SimulationError::InvalidConfig(
                "line_capacity must be > 0".to_string(),
            ));
        }

        for &(line, capacity) in &config.capacity_overrides {
            if line >= config.num_lines {
                return Err(SimulationError::InvalidConfig(format!(
                    "capacity override for line {} but only {} lines",
                    line, config.num_lines
                )));
            }
            if capacity == 0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "capacity override for line {} must be > 0",
                    line
                )));
            }
        }

        if let Some(rework) = config.rework_line {
            if rework >= config.num_lines {
                return Err(SimulationError::InvalidConfig(format!(
                    "rework_line {} but only {} lines",
                    rework, config.num_lines
                )));
            }
        }

        config
            .kind_distribution
            .validate()
            .map_err(SimulationError::InvalidConfig)?;

        config
            .reward
            .validate()
            .map_err(SimulationError::InvalidConfig)?;

        Ok(())
    }

    /// Rebuild an engine from checkpointed parts
    pub(crate) fn from_parts(
        config: OrchestratorConfig,
        lines: BufferLineSet,
        next_vehicle_id: u64,
        rng: RngManager,
        clock: StepClock,
        metrics: EpisodeMetrics,
    ) -> Self {
        let generator =
            VehicleGenerator::new(config.kind_distribution.clone()).with_next_id(next_vehicle_id);
        let rules = config.routing_rules();
        let phase = if clock.current_step() == 0 {
            EnginePhase::Ready
        } else if lines.is_empty() {
            EnginePhase::Terminal
        } else {
            EnginePhase::Running
        };

        Self {
            config,
            lines,
            generator,
            rng,
            clock,
            rules,
            event_log: EventLog::new(),
            metrics,
            phase,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Read-only view of the line set
    pub fn lines(&self) -> &BufferLineSet {
        &self.lines
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Steps taken in the current episode
    pub fn current_step(&self) -> usize {
        self.clock.current_step()
    }

    pub fn episode(&self) -> usize {
        self.clock.episode()
    }

    pub fn clock(&self) -> &StepClock {
        &self.clock
    }

    pub fn metrics(&self) -> &EpisodeMetrics {
        &self.metrics
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn rng(&self) -> &RngManager {
        &self.rng
    }

    /// Id the next admitted vehicle will receive
    pub fn next_vehicle_id(&self) -> u64 {
        self.generator.peek_next_id()
    }

    /// Size of the discrete action space
    pub fn num_actions(&self) -> usize {
        Action::space_size(self.lines.num_lines())
    }

    /// Current observable state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_lines(&self.lines)
    }

    fn log_event(&mut self, event: Event) {
        self.event_log.log(event);
    }

    // ========================================================================
    // Episode Control
    // ========================================================================

    /// Clear every line and return to `Ready`
    ///
    /// The RNG stream continues, so consecutive episodes differ. Use
    /// [`Orchestrator::reseed`] to replay from a known seed.
    pub fn reset(&mut self) -> Snapshot {
        self.lines.clear();
        self.clock.start_episode();
        self.metrics = EpisodeMetrics::new();
        self.event_log.clear();
        self.phase = EnginePhase::Ready;

        let episode = self.clock.episode();
        self.log_event(Event::EpisodeReset { episode });
        debug!(episode, "episode reset");

        self.snapshot()
    }

    /// Replace the RNG state
    ///
    /// Affects the next kind draw and redistribution targets only; line
    /// contents are untouched.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RngManager::new(seed);
        debug!(seed, "rng reseeded");
    }

    // ========================================================================
    // Step Loop
    // ========================================================================

    /// Execute one control step
    ///
    /// # Errors
    ///
    /// * `Routing(InvalidLine)` - `Place` targets a line outside the buffer;
    ///   nothing is mutated and no randomness is consumed
    /// * `InvariantViolation` - a line exceeded its capacity or a vehicle
    ///   appeared twice
    #[instrument(skip(self), fields(episode = self.clock.episode()))]
    pub fn step(&mut self, action: Action) -> Result<StepResult, SimulationError> {
        let outcome = apply_action(
            &mut self.lines,
            action,
            &self.rules,
            &mut self.generator,
            &mut self.rng,
        )?;

        self.clock.advance_step();
        let step = self.clock.current_step();

        let aged = self.lines.age_all();

        self.lines
            .check_invariants()
            .map_err(|e| SimulationError::InvariantViolation(e.to_string()))?;

        let breakdown = compute_reward(&outcome, &self.lines, &self.config.reward);
        let reward = breakdown.total();
        self.metrics.record(&outcome, &breakdown, &self.lines);

        self.log_outcome(step, &outcome);
        self.log_event(Event::VehiclesAged { step, count: aged });
        self.log_event(Event::RewardAccrued {
            step,
            breakdown: breakdown.clone(),
        });

        let terminal = self.lines.is_empty();
        self.phase = if terminal {
            self.log_event(Event::EpisodeTerminal { step });
            EnginePhase::Terminal
        } else {
            EnginePhase::Running
        };

        trace!(
            step,
            %action,
            reward,
            vehicles = self.lines.total_vehicles(),
            "step complete"
        );
        if terminal {
            debug!(step, total_reward = self.metrics.total_reward, "episode terminal");
        }

        Ok(StepResult {
            step,
            snapshot: self.snapshot(),
            reward,
            breakdown,
            terminal,
            phase: self.phase,
            outcome,
        })
    }

    /// Decode a flat action index and step
    pub fn step_index(&mut self, index: usize) -> Result<StepResult, SimulationError> {
        let action = Action::from_index(index, self.lines.num_lines())?;
        self.step(action)
    }

    fn log_outcome(&mut self, step: usize, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Placed {
                line,
                vehicle,
                kind,
            } => self.log_event(Event::VehicleAdmitted {
                step,
                line: *line,
                vehicle: *vehicle,
                kind: *kind,
            }),
            ActionOutcome::Rejected { line, kind } => self.log_event(Event::AdmissionRejected {
                step,
                line: *line,
                kind: *kind,
            }),
            ActionOutcome::Cleared { kind, evicted } => self.log_event(Event::LineCleared {
                step,
                kind: *kind,
                evicted: *evicted,
            }),
            ActionOutcome::Redistributed { moves, .. } => {
                for mv in moves {
                    self.log_event(Event::VehicleMoved {
                        step,
                        vehicle: mv.vehicle,
                        from: mv.from,
                        to: mv.to,
                    });
                }
            }
        }
    }
}
