//! Buffer Line Set
//!
//! The complete mutable state of the buffer: every holding line, indexed
//! `0..N-1`. The engine owns exactly one set and threads it by `&mut` through
//! each step; no other component keeps a copy of line contents.
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: every line holds at most `capacity` vehicles
//! 2. **Uniqueness**: a vehicle id appears in exactly one line
//! 3. **Conservation**: only admission adds vehicles, only eviction removes them;
//!    redistribution never changes the total

use crate::models::line::{BufferLine, LineRole};
use crate::models::vehicle::{Vehicle, VehicleId, VehicleKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by line-set operations
#[derive(Debug, Error, PartialEq)]
pub enum LineSetError {
    #[error("Line {line} does not exist (buffer has {num_lines} lines)")]
    UnknownLine { line: usize, num_lines: usize },

    #[error("Line {line} holds {len} vehicles but capacity is {capacity}")]
    CapacityExceeded {
        line: usize,
        len: usize,
        capacity: usize,
    },

    #[error("Vehicle {0} appears in more than one line")]
    DuplicateVehicle(VehicleId),

    #[error("Line {line} is a {role:?} line and cannot hold {kind:?} vehicle {vehicle}")]
    RoleViolation {
        line: usize,
        role: LineRole,
        vehicle: VehicleId,
        kind: VehicleKind,
    },
}

/// All buffer lines of one engine instance
///
/// # Example
///
/// ```rust
/// use buffer_sim_core_rs::{BufferLineSet, Vehicle, VehicleId, VehicleKind};
///
/// let mut lines = BufferLineSet::uniform(12, 10);
/// assert_eq!(lines.num_lines(), 12);
///
/// let admitted = lines.admit(0, Vehicle::new(VehicleId(1), VehicleKind::Green)).unwrap();
/// assert!(admitted);
/// assert_eq!(lines.total_vehicles(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferLineSet {
    lines: Vec<BufferLine>,
}

impl BufferLineSet {
    /// Build a set from per-line capacities, optionally marking a rework line
    ///
    /// An out-of-range `rework_line` is ignored here; config validation
    /// rejects it before the engine gets this far.
    pub fn new(capacities: &[usize], rework_line: Option<usize>) -> Self {
        let lines = capacities
            .iter()
            .enumerate()
            .map(|(idx, &capacity)| {
                let role = if rework_line == Some(idx) {
                    LineRole::Rework
                } else {
                    LineRole::Standard
                };
                BufferLine::new(idx, capacity).with_role(role)
            })
            .collect();

        Self { lines }
    }

    /// `num_lines` standard lines of equal capacity
    pub fn uniform(num_lines: usize, capacity: usize) -> Self {
        Self::new(&vec![capacity; num_lines], None)
    }

    /// Rebuild from checkpointed lines, checking every invariant
    pub fn from_lines(lines: Vec<BufferLine>) -> Result<Self, LineSetError> {
        let set = Self { lines };
        set.check_invariants()?;
        Ok(set)
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[BufferLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&BufferLine> {
        self.lines.get(index)
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut BufferLine, LineSetError> {
        let num_lines = self.lines.len();
        self.lines.get_mut(index).ok_or(LineSetError::UnknownLine {
            line: index,
            num_lines,
        })
    }

    /// Whether `line` could take one more vehicle of `kind` right now
    pub fn can_admit(&self, line: usize, kind: VehicleKind) -> Result<bool, LineSetError> {
        self.line(line)
            .map(|l| l.can_admit(kind))
            .ok_or(LineSetError::UnknownLine {
                line,
                num_lines: self.lines.len(),
            })
    }

    /// Insert `vehicle` at the tail of `line`
    ///
    /// Returns `Ok(false)` when the line is full (or its role refuses the
    /// kind); rejection is a normal outcome and leaves the set untouched.
    pub fn admit(&mut self, line: usize, vehicle: Vehicle) -> Result<bool, LineSetError> {
        Ok(self.line_mut(line)?.push(vehicle).is_ok())
    }

    /// Remove, from every line, all vehicles matching `predicate`
    ///
    /// Survivors keep their relative order. Returns the number removed.
    pub fn evict_by_predicate<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Vehicle) -> bool,
    {
        self.lines
            .iter_mut()
            .map(|line| line.evict_where(&mut predicate))
            .sum()
    }

    /// Move one vehicle from `source` to the tail of `target`
    ///
    /// Happens only if `target` has spare capacity and accepts the vehicle's
    /// kind, measured before the vehicle leaves `source`. So a move back into
    /// its own line requires that line to have a free slot, and re-queues the
    /// vehicle at the tail. Returns `Ok(false)` when nothing moved (including
    /// when `vehicle` is not in `source`).
    pub fn redistribute(
        &mut self,
        source: usize,
        target: usize,
        vehicle: VehicleId,
    ) -> Result<bool, LineSetError> {
        let num_lines = self.lines.len();
        if target >= num_lines {
            return Err(LineSetError::UnknownLine {
                line: target,
                num_lines,
            });
        }

        let kind = match self.line_mut(source)?.contents().iter().find(|v| v.id() == vehicle) {
            Some(v) => v.kind(),
            None => return Ok(false),
        };

        if !self.lines[target].can_admit(kind) {
            return Ok(false);
        }

        // Remove and re-insert within the same call; nothing observes the
        // in-between state.
        let moving = match self.lines[source].remove(vehicle) {
            Some(v) => v,
            None => return Ok(false),
        };
        if let Err(rejected) = self.lines[target].push(moving) {
            // can_admit above rules this out; put the vehicle back rather than lose it
            let len = self.lines[source].len();
            let capacity = self.lines[source].capacity();
            self.lines[source]
                .push(rejected)
                .map_err(|_| LineSetError::CapacityExceeded {
                    line: source,
                    len: len + 1,
                    capacity,
                })?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Increment waiting time of every resident; returns how many were aged
    pub fn age_all(&mut self) -> usize {
        self.lines.iter_mut().map(BufferLine::age_all).sum()
    }

    /// `(line, vehicle)` for every resident, in line order then queue order
    pub fn resident_ids(&self) -> Vec<(usize, VehicleId)> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(idx, line)| line.contents().iter().map(move |v| (idx, v.id())))
            .collect()
    }

    pub fn total_vehicles(&self) -> usize {
        self.lines.iter().map(BufferLine::len).sum()
    }

    /// True when every line is empty
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(BufferLine::is_empty)
    }

    pub fn count_kind(&self, kind: VehicleKind) -> usize {
        self.lines.iter().map(|l| l.count_kind(kind)).sum()
    }

    pub fn count_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&Vehicle) -> bool,
    {
        self.lines
            .iter()
            .flat_map(|l| l.contents().iter())
            .filter(|v| predicate(v))
            .count()
    }

    /// Mean per-line occupancy ratio
    pub fn utilization(&self) -> f64 {
        if self.lines.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.lines.iter().map(BufferLine::occupancy_ratio).sum();
        sum / self.lines.len() as f64
    }

    /// Highest per-line occupancy ratio
    pub fn peak_occupancy(&self) -> f64 {
        self.lines
            .iter()
            .map(BufferLine::occupancy_ratio)
            .fold(0.0, f64::max)
    }

    /// Empty every line
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// Verify capacity bounds, line roles and id uniqueness
    pub fn check_invariants(&self) -> Result<(), LineSetError> {
        let mut seen = std::collections::HashSet::new();
        for line in &self.lines {
            if line.len() > line.capacity() {
                return Err(LineSetError::CapacityExceeded {
                    line: line.index(),
                    len: line.len(),
                    capacity: line.capacity(),
                });
            }
            for vehicle in line.contents() {
                if !line.accepts(vehicle.kind()) {
                    return Err(LineSetError::RoleViolation {
                        line: line.index(),
                        role: line.role(),
                        vehicle: vehicle.id(),
                        kind: vehicle.kind(),
                    });
                }
                if !seen.insert(vehicle.id()) {
                    return Err(LineSetError::DuplicateVehicle(vehicle.id()));
                }
            }
        }
        Ok(())
    }
}
