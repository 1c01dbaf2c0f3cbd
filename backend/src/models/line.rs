//! Buffer line model
//!
//! A buffer line is an ordered, capacity-bounded holding queue. Vehicles are
//! appended at the tail; removal may happen anywhere (clearance is type-based,
//! not position-based), and survivors keep their relative order.

use crate::models::vehicle::{Vehicle, VehicleId, VehicleKind};
use serde::{Deserialize, Serialize};

/// What a line is allowed to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineRole {
    /// Holds any vehicle kind
    #[default]
    Standard,
    /// Holds only Faulty vehicles waiting for rework
    Rework,
}

/// A single holding line
///
/// # Example
/// ```
/// use buffer_sim_core_rs::{BufferLine, VehicleKind};
///
/// let line = BufferLine::new(0, 10);
/// assert!(line.has_space());
/// assert!(line.accepts(VehicleKind::Green));
/// assert_eq!(line.len(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferLine {
    index: usize,
    capacity: usize,
    role: LineRole,
    /// Residents in insertion order (head = oldest admission)
    contents: Vec<Vehicle>,
}

impl BufferLine {
    pub fn new(index: usize, capacity: usize) -> Self {
        Self {
            index,
            capacity,
            role: LineRole::Standard,
            contents: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: LineRole) -> Self {
        self.role = role;
        self
    }

    /// Restore a line from checkpointed contents
    ///
    /// Contents are taken as given; callers validate capacity afterwards.
    pub fn from_snapshot(index: usize, capacity: usize, role: LineRole, contents: Vec<Vehicle>) -> Self {
        Self {
            index,
            capacity,
            role,
            contents,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn role(&self) -> LineRole {
        self.role
    }

    pub fn contents(&self) -> &[Vehicle] {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn has_space(&self) -> bool {
        self.contents.len() < self.capacity
    }

    /// Whether this line's role admits the given kind
    pub fn accepts(&self, kind: VehicleKind) -> bool {
        match self.role {
            LineRole::Standard => true,
            LineRole::Rework => kind == VehicleKind::Faulty,
        }
    }

    /// Both role and capacity allow one more vehicle of `kind`
    pub fn can_admit(&self, kind: VehicleKind) -> bool {
        self.has_space() && self.accepts(kind)
    }

    /// Fraction of capacity in use
    pub fn occupancy_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.contents.len() as f64 / self.capacity as f64
    }

    pub fn count_kind(&self, kind: VehicleKind) -> usize {
        self.contents.iter().filter(|v| v.kind() == kind).count()
    }

    pub fn position_of(&self, id: VehicleId) -> Option<usize> {
        self.contents.iter().position(|v| v.id() == id)
    }

    /// Append at the tail if admissible; hands the vehicle back otherwise
    pub(crate) fn push(&mut self, vehicle: Vehicle) -> Result<(), Vehicle> {
        if !self.can_admit(vehicle.kind()) {
            return Err(vehicle);
        }
        self.contents.push(vehicle);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: VehicleId) -> Option<Vehicle> {
        let pos = self.position_of(id)?;
        Some(self.contents.remove(pos))
    }

    /// Remove every vehicle matching `predicate`, keeping survivor order
    pub(crate) fn evict_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Vehicle) -> bool,
    {
        let before = self.contents.len();
        self.contents.retain(|v| !predicate(v));
        before - self.contents.len()
    }

    pub(crate) fn age_all(&mut self) -> usize {
        for vehicle in &mut self.contents {
            vehicle.age();
        }
        self.contents.len()
    }

    pub(crate) fn clear(&mut self) {
        self.contents.clear();
    }
}
