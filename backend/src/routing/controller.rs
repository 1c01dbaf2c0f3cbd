//! Routing controller
//!
//! Applies one [`Action`] to the whole [`BufferLineSet`]. The controller owns
//! no state of its own: the line set, the vehicle generator and the RNG are
//! all borrowed from the engine for the duration of the call.
//!
//! # Action semantics
//!
//! ```text
//! Place{line}       draw kind → admit at tail if line has room, else reject
//! SendGreen         evict all Green, every line
//! SendFaulty        evict all Faulty, every line
//! MoveWithinBuffer  each resident → one random target; moves iff target has room
//! SendOther         evict all Other with waiting_time >= other_release_age
//! ```

use crate::arrivals::VehicleGenerator;
use crate::models::state::BufferLineSet;
use crate::models::vehicle::VehicleKind;
use crate::rng::RngManager;
use crate::routing::action::{Action, ActionOutcome, RoutingError, VehicleMove};
use serde::{Deserialize, Serialize};

/// Tunable parts of action semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRules {
    /// Minimum waiting time for an Other vehicle to leave on `SendOther`
    pub other_release_age: u32,
}

impl Default for RoutingRules {
    fn default() -> Self {
        Self {
            other_release_age: 5,
        }
    }
}

/// Apply `action` to `lines`
///
/// Returns what happened. A full line on `Place` is a normal
/// [`ActionOutcome::Rejected`]; only a line index outside the buffer is an
/// error, and in that case nothing is mutated and no randomness is consumed.
pub fn apply_action(
    lines: &mut BufferLineSet,
    action: Action,
    rules: &RoutingRules,
    generator: &mut VehicleGenerator,
    rng: &mut RngManager,
) -> Result<ActionOutcome, RoutingError> {
    match action {
        Action::Place { line } => place(lines, line, generator, rng),
        Action::SendGreen => Ok(clear_kind(lines, VehicleKind::Green, 0)),
        Action::SendFaulty => Ok(clear_kind(lines, VehicleKind::Faulty, 0)),
        Action::SendOther => Ok(clear_kind(lines, VehicleKind::Other, rules.other_release_age)),
        Action::MoveWithinBuffer => move_within_buffer(lines, rng),
    }
}

fn place(
    lines: &mut BufferLineSet,
    line: usize,
    generator: &mut VehicleGenerator,
    rng: &mut RngManager,
) -> Result<ActionOutcome, RoutingError> {
    let num_lines = lines.num_lines();
    if line >= num_lines {
        return Err(RoutingError::InvalidLine { line, num_lines });
    }

    // Draw before the capacity check so the RNG stream does not depend on
    // admission outcomes.
    let kind = generator.draw_kind(rng);
    if !lines.can_admit(line, kind)? {
        return Ok(ActionOutcome::Rejected { line, kind });
    }

    let vehicle = generator.next_vehicle(kind);
    let id = vehicle.id();
    if lines.admit(line, vehicle)? {
        Ok(ActionOutcome::Placed {
            line,
            vehicle: id,
            kind,
        })
    } else {
        Ok(ActionOutcome::Rejected { line, kind })
    }
}

fn clear_kind(lines: &mut BufferLineSet, kind: VehicleKind, min_waiting_time: u32) -> ActionOutcome {
    let evicted =
        lines.evict_by_predicate(|v| v.kind() == kind && v.waiting_time() >= min_waiting_time);
    ActionOutcome::Cleared { kind, evicted }
}

/// One redistribution attempt per resident, in line order then queue order
///
/// The resident list is fixed before the pass starts, so a vehicle that has
/// already moved into a later line is not visited a second time. Targets are
/// drawn uniformly over all lines, the vehicle's own line included.
fn move_within_buffer(
    lines: &mut BufferLineSet,
    rng: &mut RngManager,
) -> Result<ActionOutcome, RoutingError> {
    let residents = lines.resident_ids();
    let num_lines = lines.num_lines();
    let mut moves = Vec::new();

    if num_lines == 0 {
        return Ok(ActionOutcome::Redistributed { attempts: 0, moves });
    }

    for (source, vehicle) in residents.iter().copied() {
        let target = rng.index(num_lines);
        if lines.redistribute(source, target, vehicle)? {
            moves.push(VehicleMove {
                vehicle,
                from: source,
                to: target,
            });
        }
    }

    Ok(ActionOutcome::Redistributed {
        attempts: residents.len(),
        moves,
    })
}
