//! Event logging for simulation replay and auditing.
//!
//! Every significant state change during a step is captured as an [`Event`].
//! Events enable:
//! - Debugging (what happened to a given vehicle, and when)
//! - Auditing (conservation and capacity can be re-checked from the log)
//! - Analysis (reward attribution per step)
//!
//! # Event Types
//!
//! Events follow the step pipeline:
//! - **Routing**: admission, rejection, clearance, redistribution
//! - **Aging**: residents aged at the end of the step
//! - **Reward**: breakdown of the step reward
//! - **Episode**: reset and terminal markers
//!
//! # Example
//!
//! ```rust
//! use buffer_sim_core_rs::models::Event;
//! use buffer_sim_core_rs::{VehicleId, VehicleKind};
//!
//! let event = Event::VehicleAdmitted {
//!     step: 10,
//!     line: 3,
//!     vehicle: VehicleId(42),
//!     kind: VehicleKind::Green,
//! };
//!
//! assert_eq!(event.step(), 10);
//! assert_eq!(event.event_type(), "VehicleAdmitted");
//! ```

use crate::models::vehicle::{VehicleId, VehicleKind};
use crate::rewards::RewardBreakdown;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
///
/// `step` is the 1-based number of the step that produced the event within
/// its episode; reset events carry step 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// New vehicle admitted to a line
    VehicleAdmitted {
        step: usize,
        line: usize,
        vehicle: VehicleId,
        kind: VehicleKind,
    },

    /// `Place` refused; no vehicle was created
    AdmissionRejected {
        step: usize,
        line: usize,
        kind: VehicleKind,
    },

    /// Clearance sweep released vehicles of one kind
    LineCleared {
        step: usize,
        kind: VehicleKind,
        evicted: usize,
    },

    /// One vehicle moved during redistribution
    VehicleMoved {
        step: usize,
        vehicle: VehicleId,
        from: usize,
        to: usize,
    },

    /// Residents aged at the end of a step
    VehiclesAged { step: usize, count: usize },

    /// Reward booked for the step
    RewardAccrued {
        step: usize,
        breakdown: RewardBreakdown,
    },

    /// Every line empty after the step
    EpisodeTerminal { step: usize },

    /// Engine returned to Ready
    EpisodeReset { episode: usize },
}

impl Event {
    /// Step at which this event occurred
    pub fn step(&self) -> usize {
        match self {
            Event::VehicleAdmitted { step, .. } => *step,
            Event::AdmissionRejected { step, .. } => *step,
            Event::LineCleared { step, .. } => *step,
            Event::VehicleMoved { step, .. } => *step,
            Event::VehiclesAged { step, .. } => *step,
            Event::RewardAccrued { step, .. } => *step,
            Event::EpisodeTerminal { step } => *step,
            Event::EpisodeReset { .. } => 0,
        }
    }

    /// Short name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::VehicleAdmitted { .. } => "VehicleAdmitted",
            Event::AdmissionRejected { .. } => "AdmissionRejected",
            Event::LineCleared { .. } => "LineCleared",
            Event::VehicleMoved { .. } => "VehicleMoved",
            Event::VehiclesAged { .. } => "VehiclesAged",
            Event::RewardAccrued { .. } => "RewardAccrued",
            Event::EpisodeTerminal { .. } => "EpisodeTerminal",
            Event::EpisodeReset { .. } => "EpisodeReset",
        }
    }

    /// Vehicle this event is about, if any
    pub fn vehicle(&self) -> Option<VehicleId> {
        match self {
            Event::VehicleAdmitted { vehicle, .. } => Some(*vehicle),
            Event::VehicleMoved { vehicle, .. } => Some(*vehicle),
            _ => None,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// A thin wrapper around `Vec<Event>`; holds the current episode only.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events produced by a given step
    pub fn events_at_step(&self, step: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.step() == step).collect()
    }

    /// Events of a given type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Full history of one vehicle
    pub fn events_for_vehicle(&self, vehicle: VehicleId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.vehicle() == Some(vehicle))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
