//! Vehicle model
//!
//! A vehicle is the unit moving through the buffer. Each vehicle has:
//! - A kind (Green, Faulty, Other) fixed at creation
//! - A waiting time, counted in simulation steps
//! - An engine-unique id, used only internally and in the event log

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Vehicle classification
///
/// Determines which clearance action may release the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    /// Priority vehicle, released by `SendGreen`
    Green,
    /// Defective vehicle, released to rework by `SendFaulty`
    Faulty,
    /// Default vehicle, released by `SendOther` once old enough
    Other,
}

impl VehicleKind {
    /// All kinds in canonical order
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Green, VehicleKind::Faulty, VehicleKind::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleKind::Green => "green",
            VehicleKind::Faulty => "faulty",
            VehicleKind::Other => "other",
        }
    }

    /// Position of this kind in [`VehicleKind::ALL`]
    pub fn ordinal(&self) -> usize {
        match self {
            VehicleKind::Green => 0,
            VehicleKind::Faulty => 1,
            VehicleKind::Other => 2,
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when building vehicles
#[derive(Debug, Error, PartialEq)]
pub enum VehicleError {
    #[error("Unknown vehicle kind '{0}' (expected green, faulty or other)")]
    UnknownKind(String),
}

impl FromStr for VehicleKind {
    type Err = VehicleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(VehicleKind::Green),
            "faulty" => Ok(VehicleKind::Faulty),
            "other" => Ok(VehicleKind::Other),
            _ => Err(VehicleError::UnknownKind(s.to_string())),
        }
    }
}

/// Engine-unique vehicle identifier
///
/// Allocated sequentially so that identical seeds yield identical ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "veh_{:08}", self.0)
    }
}

/// A vehicle resident in a buffer line
///
/// # Example
/// ```
/// use buffer_sim_core_rs::{Vehicle, VehicleId, VehicleKind};
///
/// let mut vehicle = Vehicle::new(VehicleId(1), VehicleKind::Green);
/// assert_eq!(vehicle.waiting_time(), 0);
/// vehicle.age();
/// assert_eq!(vehicle.waiting_time(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    id: VehicleId,
    kind: VehicleKind,
    /// Steps spent in any buffer line
    waiting_time: u32,
}

impl Vehicle {
    /// Create a freshly admitted vehicle (waiting time 0)
    pub fn new(id: VehicleId, kind: VehicleKind) -> Self {
        Self {
            id,
            kind,
            waiting_time: 0,
        }
    }

    /// Restore a vehicle from checkpointed fields
    pub fn from_snapshot(id: VehicleId, kind: VehicleKind, waiting_time: u32) -> Self {
        Self {
            id,
            kind,
            waiting_time,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn waiting_time(&self) -> u32 {
        self.waiting_time
    }

    /// Advance waiting time by one step
    pub fn age(&mut self) {
        self.waiting_time = self.waiting_time.saturating_add(1);
    }
}
