//! Control actions and their outcomes

use crate::models::state::LineSetError;
use crate::models::vehicle::{VehicleId, VehicleKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while applying an action
#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    #[error("Action targets line {line}, but buffer has {num_lines} lines")]
    InvalidLine { line: usize, num_lines: usize },

    #[error("Action index {index} outside action space of size {space}")]
    UnknownActionIndex { index: usize, space: usize },

    #[error("Line set error: {0}")]
    LineSet(#[from] LineSetError),
}

/// One discrete control action
///
/// Every action except `Place` applies to the whole buffer in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Create one vehicle and admit it to `line`
    Place { line: usize },
    /// Release every Green vehicle
    SendGreen,
    /// Release every Faulty vehicle to rework
    SendFaulty,
    /// Try to move every resident to a random line
    MoveWithinBuffer,
    /// Release every Other vehicle that has waited long enough
    SendOther,
}

impl Action {
    /// Size of the discrete action space for a buffer of `num_lines`
    ///
    /// One `Place` per line plus the four buffer-wide actions.
    pub fn space_size(num_lines: usize) -> usize {
        num_lines + 4
    }

    /// Decode a flat action index
    ///
    /// `0..N` → `Place { line }`, then `SendGreen`, `SendFaulty`,
    /// `MoveWithinBuffer`, `SendOther`.
    ///
    /// # Example
    /// ```
    /// use buffer_sim_core_rs::routing::Action;
    ///
    /// assert_eq!(Action::from_index(3, 12).unwrap(), Action::Place { line: 3 });
    /// assert_eq!(Action::from_index(12, 12).unwrap(), Action::SendGreen);
    /// assert_eq!(Action::from_index(15, 12).unwrap(), Action::SendOther);
    /// assert!(Action::from_index(16, 12).is_err());
    /// ```
    pub fn from_index(index: usize, num_lines: usize) -> Result<Self, RoutingError> {
        if index < num_lines {
            return Ok(Action::Place { line: index });
        }
        match index - num_lines {
            0 => Ok(Action::SendGreen),
            1 => Ok(Action::SendFaulty),
            2 => Ok(Action::MoveWithinBuffer),
            3 => Ok(Action::SendOther),
            _ => Err(RoutingError::UnknownActionIndex {
                index,
                space: Self::space_size(num_lines),
            }),
        }
    }

    /// Inverse of [`Action::from_index`]
    pub fn to_index(&self, num_lines: usize) -> usize {
        match self {
            Action::Place { line } => *line,
            Action::SendGreen => num_lines,
            Action::SendFaulty => num_lines + 1,
            Action::MoveWithinBuffer => num_lines + 2,
            Action::SendOther => num_lines + 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Place { .. } => "Place",
            Action::SendGreen => "SendGreen",
            Action::SendFaulty => "SendFaulty",
            Action::MoveWithinBuffer => "MoveWithinBuffer",
            Action::SendOther => "SendOther",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place { line } => write!(f, "Place({})", line),
            other => f.write_str(other.name()),
        }
    }
}

/// A single successful redistribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleMove {
    pub vehicle: VehicleId,
    pub from: usize,
    pub to: usize,
}

/// What an action actually did to the buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionOutcome {
    /// A new vehicle was admitted
    Placed {
        line: usize,
        vehicle: VehicleId,
        kind: VehicleKind,
    },

    /// Admission refused (line full, or rework line and kind not Faulty);
    /// no vehicle was created
    Rejected { line: usize, kind: VehicleKind },

    /// A clearance sweep ran
    Cleared { kind: VehicleKind, evicted: usize },

    /// A redistribution pass ran
    Redistributed {
        attempts: usize,
        moves: Vec<VehicleMove>,
    },
}

impl ActionOutcome {
    /// Net change in total vehicle count caused by this outcome
    pub fn population_delta(&self) -> i64 {
        match self {
            ActionOutcome::Placed { .. } => 1,
            ActionOutcome::Cleared { evicted, .. } => -(*evicted as i64),
            ActionOutcome::Rejected { .. } | ActionOutcome::Redistributed { .. } => 0,
        }
    }

    pub fn evicted(&self) -> usize {
        match self {
            ActionOutcome::Cleared { evicted, .. } => *evicted,
            _ => 0,
        }
    }

    pub fn moves(&self) -> usize {
        match self {
            ActionOutcome::Redistributed { moves, .. } => moves.len(),
            _ => 0,
        }
    }
}
