//! Observable state handed to the caller after `reset` and every `step`

use crate::models::state::BufferLineSet;
use crate::models::vehicle::VehicleKind;
use serde::{Deserialize, Serialize};

/// Immutable view: line index → ordered `(kind, waiting_time)`, head first
///
/// Carries no vehicle ids, capacities or line roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    lines: Vec<Vec<(VehicleKind, u32)>>,
}

impl Snapshot {
    pub fn from_lines(set: &BufferLineSet) -> Self {
        let lines = set
            .lines()
            .iter()
            .map(|line| {
                line.contents()
                    .iter()
                    .map(|v| (v.kind(), v.waiting_time()))
                    .collect()
            })
            .collect();
        Self { lines }
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&[(VehicleKind, u32)]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    pub fn lines(&self) -> &[Vec<(VehicleKind, u32)>] {
        &self.lines
    }

    /// True when every line is empty
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Vec::is_empty)
    }

    pub fn total_vehicles(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Fixed-width encoding: per line `[green, faulty, other, max_wait]`
    pub fn to_feature_vector(&self) -> Vec<f64> {
        let mut features = Vec::with_capacity(self.lines.len() * 4);
        for line in &self.lines {
            let mut counts = [0usize; 3];
            let mut max_wait = 0u32;
            for (kind, wait) in line {
                counts[kind.ordinal()] += 1;
                max_wait = max_wait.max(*wait);
            }
            features.extend(counts.iter().map(|&c| c as f64));
            features.push(max_wait as f64);
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::{Vehicle, VehicleId};

    #[test]
    fn test_snapshot_preserves_queue_order() {
        let mut set = BufferLineSet::uniform(2, 3);
        set.admit(1, Vehicle::from_snapshot(VehicleId(1), VehicleKind::Other, 4))
            .unwrap();
        set.admit(1, Vehicle::from_snapshot(VehicleId(2), VehicleKind::Green, 1))
            .unwrap();

        let snap = Snapshot::from_lines(&set);
        assert_eq!(snap.num_lines(), 2);
        assert_eq!(snap.line(0), Some(&[][..]));
        assert_eq!(
            snap.line(1),
            Some(&[(VehicleKind::Other, 4), (VehicleKind::Green, 1)][..])
        );
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_feature_vector_layout() {
        let mut set = BufferLineSet::uniform(2, 3);
        set.admit(0, Vehicle::from_snapshot(VehicleId(1), VehicleKind::Faulty, 2))
            .unwrap();
        set.admit(0, Vehicle::from_snapshot(VehicleId(2), VehicleKind::Faulty, 7))
            .unwrap();

        let features = Snapshot::from_lines(&set).to_feature_vector();
        assert_eq!(features, vec![0.0, 2.0, 0.0, 7.0, 0.0, 0.0, 0.0, 0.0]);
    }
}
