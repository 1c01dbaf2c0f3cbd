//! Routing Module
//!
//! Interprets the five discrete control actions against the buffer line set:
//! - Admission of a new vehicle into a chosen line (`Place`)
//! - Global clearance sweeps by kind (`SendGreen`, `SendFaulty`, `SendOther`)
//! - Random redistribution of every resident (`MoveWithinBuffer`)
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: no action ever leaves a line above capacity; a full line
//!    rejects admission rather than truncating
//! 2. **Conservation**: redistribution never creates or destroys vehicles
//! 3. **Fail fast**: a line index outside the buffer is an error, never clamped
//!
//! # Example
//!
//! ```rust
//! use buffer_sim_core_rs::arrivals::{KindDistribution, VehicleGenerator};
//! use buffer_sim_core_rs::routing::{apply_action, Action, ActionOutcome, RoutingRules};
//! use buffer_sim_core_rs::{BufferLineSet, RngManager, VehicleKind};
//!
//! let mut lines = BufferLineSet::uniform(3, 2);
//! let mut generator = VehicleGenerator::new(KindDistribution::Fixed { kind: VehicleKind::Green });
//! let mut rng = RngManager::new(1);
//!
//! let outcome = apply_action(
//!     &mut lines,
//!     Action::Place { line: 0 },
//!     &RoutingRules::default(),
//!     &mut generator,
//!     &mut rng,
//! )
//! .unwrap();
//! assert!(matches!(outcome, ActionOutcome::Placed { line: 0, .. }));
//!
//! let outcome = apply_action(&mut lines, Action::SendGreen, &RoutingRules::default(), &mut generator, &mut rng).unwrap();
//! assert_eq!(outcome, ActionOutcome::Cleared { kind: VehicleKind::Green, evicted: 1 });
//! assert!(lines.is_empty());
//! ```

pub mod action;
pub mod controller;

// Re-export public API
pub use action::{Action, ActionOutcome, RoutingError, VehicleMove};
pub use controller::{apply_action, RoutingRules};
