//! Tests for BufferLine and BufferLineSet
//!
//! Admission, eviction, redistribution and the capacity invariant.

use buffer_sim_core_rs::{
    BufferLine, BufferLineSet, LineRole, LineSetError, Vehicle, VehicleId, VehicleKind,
};

fn vehicle(id: u64, kind: VehicleKind) -> Vehicle {
    Vehicle::new(VehicleId(id), kind)
}

fn ids(set: &BufferLineSet, line: usize) -> Vec<u64> {
    set.line(line)
        .unwrap()
        .contents()
        .iter()
        .map(|v| v.id().0)
        .collect()
}

#[test]
fn test_admit_until_full() {
    let mut set = BufferLineSet::uniform(1, 3);

    for id in 1..=3 {
        assert!(set.admit(0, vehicle(id, VehicleKind::Green)).unwrap());
    }
    assert!(!set.admit(0, vehicle(4, VehicleKind::Green)).unwrap());

    assert_eq!(ids(&set, 0), vec![1, 2, 3]);
    assert!(!set.line(0).unwrap().has_space());
}

#[test]
fn test_admit_unknown_line_is_error() {
    let mut set = BufferLineSet::uniform(2, 3);
    let err = set.admit(2, vehicle(1, VehicleKind::Green)).unwrap_err();
    assert_eq!(err, LineSetError::UnknownLine { line: 2, num_lines: 2 });
    assert!(set.is_empty());
}

#[test]
fn test_evict_preserves_survivor_order() {
    let mut set = BufferLineSet::uniform(2, 5);
    set.admit(0, vehicle(1, VehicleKind::Other)).unwrap();
    set.admit(0, vehicle(2, VehicleKind::Green)).unwrap();
    set.admit(0, vehicle(3, VehicleKind::Faulty)).unwrap();
    set.admit(0, vehicle(4, VehicleKind::Green)).unwrap();
    set.admit(1, vehicle(5, VehicleKind::Green)).unwrap();
    set.admit(1, vehicle(6, VehicleKind::Other)).unwrap();

    let evicted = set.evict_by_predicate(|v| v.kind() == VehicleKind::Green);

    assert_eq!(evicted, 3);
    assert_eq!(ids(&set, 0), vec![1, 3]);
    assert_eq!(ids(&set, 1), vec![6]);
}

#[test]
fn test_evict_on_empty_set_is_noop() {
    let mut set = BufferLineSet::uniform(3, 2);
    assert_eq!(set.evict_by_predicate(|_| true), 0);
}

#[test]
fn test_redistribute_moves_to_tail() {
    let mut set = BufferLineSet::uniform(2, 3);
    set.admit(0, vehicle(1, VehicleKind::Green)).unwrap();
    set.admit(1, vehicle(2, VehicleKind::Other)).unwrap();

    assert!(set.redistribute(0, 1, VehicleId(1)).unwrap());
    assert_eq!(ids(&set, 0), Vec::<u64>::new());
    assert_eq!(ids(&set, 1), vec![2, 1]);
}

#[test]
fn test_redistribute_into_full_target_fails_atomically() {
    let mut set = BufferLineSet::uniform(2, 1);
    set.admit(0, vehicle(1, VehicleKind::Green)).unwrap();
    set.admit(1, vehicle(2, VehicleKind::Other)).unwrap();

    assert!(!set.redistribute(0, 1, VehicleId(1)).unwrap());
    assert_eq!(ids(&set, 0), vec![1]);
    assert_eq!(ids(&set, 1), vec![2]);
    assert_eq!(set.total_vehicles(), 2);
}

#[test]
fn test_redistribute_to_own_line_requeues_when_space() {
    let mut set = BufferLineSet::uniform(1, 3);
    set.admit(0, vehicle(1, VehicleKind::Green)).unwrap();
    set.admit(0, vehicle(2, VehicleKind::Green)).unwrap();

    assert!(set.redistribute(0, 0, VehicleId(1)).unwrap());
    assert_eq!(ids(&set, 0), vec![2, 1]);
}

#[test]
fn test_redistribute_to_own_full_line_is_noop() {
    let mut set = BufferLineSet::uniform(1, 2);
    set.admit(0, vehicle(1, VehicleKind::Green)).unwrap();
    set.admit(0, vehicle(2, VehicleKind::Green)).unwrap();

    assert!(!set.redistribute(0, 0, VehicleId(1)).unwrap());
    assert_eq!(ids(&set, 0), vec![1, 2]);
}

#[test]
fn test_redistribute_missing_vehicle_is_noop() {
    let mut set = BufferLineSet::uniform(2, 2);
    set.admit(0, vehicle(1, VehicleKind::Green)).unwrap();
    assert!(!set.redistribute(1, 0, VehicleId(1)).unwrap());
    assert_eq!(set.total_vehicles(), 1);
}

#[test]
fn test_rework_line_accepts_only_faulty() {
    let mut set = BufferLineSet::new(&[2, 2], Some(1));
    assert_eq!(set.line(1).unwrap().role(), LineRole::Rework);

    assert!(!set.admit(1, vehicle(1, VehicleKind::Green)).unwrap());
    assert!(set.admit(1, vehicle(2, VehicleKind::Faulty)).unwrap());

    set.admit(0, vehicle(3, VehicleKind::Other)).unwrap();
    set.admit(0, vehicle(4, VehicleKind::Faulty)).unwrap();
    assert!(!set.redistribute(0, 1, VehicleId(3)).unwrap());
    assert!(set.redistribute(0, 1, VehicleId(4)).unwrap());
    assert_eq!(ids(&set, 1), vec![2, 4]);
}

#[test]
fn test_age_all_increments_every_resident() {
    let mut set = BufferLineSet::uniform(2, 2);
    set.admit(0, Vehicle::from_snapshot(VehicleId(1), VehicleKind::Green, 3))
        .unwrap();
    set.admit(1, vehicle(2, VehicleKind::Other)).unwrap();

    assert_eq!(set.age_all(), 2);
    assert_eq!(set.line(0).unwrap().contents()[0].waiting_time(), 4);
    assert_eq!(set.line(1).unwrap().contents()[0].waiting_time(), 1);
}

#[test]
fn test_utilization_and_peak() {
    let mut set = BufferLineSet::new(&[2, 4], None);
    set.admit(0, vehicle(1, VehicleKind::Green)).unwrap();
    set.admit(0, vehicle(2, VehicleKind::Green)).unwrap();
    set.admit(1, vehicle(3, VehicleKind::Green)).unwrap();

    assert!((set.utilization() - 0.625).abs() < 1e-12);
    assert_eq!(set.peak_occupancy(), 1.0);
}

#[test]
fn test_from_lines_rejects_over_capacity() {
    let line = BufferLine::from_snapshot(
        0,
        1,
        LineRole::Standard,
        vec![vehicle(1, VehicleKind::Green), vehicle(2, VehicleKind::Green)],
    );
    let err = BufferLineSet::from_lines(vec![line]).unwrap_err();
    assert_eq!(
        err,
        LineSetError::CapacityExceeded {
            line: 0,
            len: 2,
            capacity: 1
        }
    );
}

#[test]
fn test_from_lines_rejects_duplicate_ids() {
    let a = BufferLine::from_snapshot(0, 2, LineRole::Standard, vec![vehicle(1, VehicleKind::Green)]);
    let b = BufferLine::from_snapshot(1, 2, LineRole::Standard, vec![vehicle(1, VehicleKind::Other)]);
    assert_eq!(
        BufferLineSet::from_lines(vec![a, b]).unwrap_err(),
        LineSetError::DuplicateVehicle(VehicleId(1))
    );
}

#[test]
fn test_clear_empties_everything() {
    let mut set = BufferLineSet::uniform(3, 2);
    set.admit(0, vehicle(1, VehicleKind::Green)).unwrap();
    set.admit(2, vehicle(2, VehicleKind::Faulty)).unwrap();
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.num_lines(), 3);
}
