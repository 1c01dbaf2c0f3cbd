//! Routing scenarios driven through the full step pipeline
//!
//! Each scenario sets up a buffer, applies one action, and checks the
//! reward, the snapshot and terminality.

use buffer_sim_core_rs::routing::{Action, ActionOutcome, RoutingError};
use buffer_sim_core_rs::{
    KindDistribution, Orchestrator, OrchestratorConfig, SimulationError, VehicleKind,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn config_with(kind: VehicleKind, num_lines: usize, capacity: usize) -> OrchestratorConfig {
    OrchestratorConfig {
        num_lines,
        line_capacity: capacity,
        kind_distribution: KindDistribution::Fixed { kind },
        ..OrchestratorConfig::default()
    }
}

/// Engine whose placements always produce `kind`
fn engine_with(kind: VehicleKind, num_lines: usize, capacity: usize) -> Orchestrator {
    Orchestrator::new(config_with(kind, num_lines, capacity)).unwrap()
}

// ============================================================================
// Scenario A: placement into an empty buffer
// ============================================================================

#[test]
fn scenario_a_place_green_into_empty_buffer() {
    let mut engine = engine_with(VehicleKind::Green, 12, 10);
    engine.reset();

    let result = engine.step(Action::Place { line: 0 }).unwrap();

    assert_eq!(result.reward, 1.0);
    assert!(!result.terminal);
    // Age-after-create: the new vehicle has waited through its own step
    assert_eq!(result.snapshot.line(0), Some(&[(VehicleKind::Green, 1)][..]));
    for line in 1..12 {
        assert_eq!(result.snapshot.line(line).map(|l| l.len()), Some(0));
    }
}

// ============================================================================
// Scenario B: placement into a full line
// ============================================================================

#[test]
fn scenario_b_place_into_full_line_is_rejected() {
    let mut engine = engine_with(VehicleKind::Other, 2, 3);
    for _ in 0..3 {
        engine.step(Action::Place { line: 0 }).unwrap();
    }
    let before = engine.snapshot();
    assert_eq!(before.line(0).map(|l| l.len()), Some(3));

    let result = engine.step(Action::Place { line: 0 }).unwrap();

    assert_eq!(result.reward, -5.0);
    assert!(matches!(result.outcome, ActionOutcome::Rejected { line: 0, .. }));
    // Unchanged apart from aging
    let expected: Vec<(VehicleKind, u32)> = before
        .line(0)
        .unwrap()
        .iter()
        .map(|(kind, wait)| (*kind, wait + 1))
        .collect();
    assert_eq!(result.snapshot.line(0), Some(&expected[..]));
    assert_eq!(engine.next_vehicle_id(), 4, "Rejection must not consume an id");
}

// ============================================================================
// Scenario C: global clearance empties the buffer
// ============================================================================

#[test]
fn scenario_c_send_green_clears_every_line() {
    let mut engine = engine_with(VehicleKind::Green, 2, 3);
    engine.step(Action::Place { line: 0 }).unwrap();
    engine.step(Action::Place { line: 1 }).unwrap();

    let result = engine.step(Action::SendGreen).unwrap();

    assert_eq!(result.reward, 10.0);
    assert!(result.terminal);
    assert!(result.snapshot.is_empty());
    assert_eq!(result.outcome.evicted(), 2);
}

#[test]
fn scenario_c_send_green_with_other_residents_is_not_terminal() {
    let mut engine = engine_with(VehicleKind::Other, 2, 3);
    engine.step(Action::Place { line: 1 }).unwrap();

    let result = engine.step(Action::SendGreen).unwrap();

    assert_eq!(result.reward, 10.0, "Flat reward even when nothing was evicted");
    assert_eq!(result.outcome.evicted(), 0);
    assert!(!result.terminal);
}

// ============================================================================
// Scenario D: age-gated release of Other vehicles
// ============================================================================

#[test]
fn scenario_d_send_other_releases_only_aged_vehicles() {
    let mut engine = engine_with(VehicleKind::Other, 2, 10);

    // First Other ages to 1 on its own step, then +1 per step
    engine.step(Action::Place { line: 0 }).unwrap();
    for _ in 0..3 {
        engine.step(Action::SendGreen).unwrap();
    }
    // Line 0 is at 4; placing into line 1 ages it to 5
    engine.step(Action::Place { line: 1 }).unwrap();
    assert_eq!(engine.snapshot().line(0), Some(&[(VehicleKind::Other, 5)][..]));

    let result = engine.step(Action::SendOther).unwrap();

    assert_eq!(result.reward, 5.0);
    assert_eq!(result.outcome.evicted(), 1);
    assert_eq!(result.snapshot.line(0).map(|l| l.len()), Some(0));
    assert_eq!(result.snapshot.line(1), Some(&[(VehicleKind::Other, 2)][..]));
}

#[test]
fn scenario_d_send_other_keeps_vehicle_at_four() {
    let mut engine = engine_with(VehicleKind::Other, 1, 10);
    engine.step(Action::Place { line: 0 }).unwrap();
    for _ in 0..3 {
        engine.step(Action::SendFaulty).unwrap();
    }
    assert_eq!(engine.snapshot().line(0), Some(&[(VehicleKind::Other, 4)][..]));

    let result = engine.step(Action::SendOther).unwrap();
    assert_eq!(result.reward, 5.0);
    assert_eq!(result.outcome.evicted(), 0);
    assert_eq!(result.snapshot.line(0), Some(&[(VehicleKind::Other, 5)][..]));
}

// ============================================================================
// Redistribution and error paths
// ============================================================================

#[test]
fn test_move_within_buffer_rewards_per_successful_move() {
    let mut engine = engine_with(VehicleKind::Green, 4, 5);
    for line in 0..4 {
        engine.step(Action::Place { line }).unwrap();
    }

    let result = engine.step(Action::MoveWithinBuffer).unwrap();
    let moves = result.outcome.moves();

    // Every target has room, so every attempt succeeds
    assert_eq!(moves, 4);
    assert_eq!(result.reward, 2.0 * moves as f64);
    assert_eq!(result.snapshot.total_vehicles(), 4);
}

#[test]
fn test_move_within_full_buffer_earns_nothing() {
    let mut engine = engine_with(VehicleKind::Green, 2, 1);
    engine.step(Action::Place { line: 0 }).unwrap();
    engine.step(Action::Place { line: 1 }).unwrap();

    let result = engine.step(Action::MoveWithinBuffer).unwrap();
    assert_eq!(result.reward, 0.0);
    assert_eq!(result.outcome.moves(), 0);
}

#[test]
fn test_clearing_empty_buffer_is_silent() {
    let mut engine = engine_with(VehicleKind::Green, 3, 2);
    let result = engine.step(Action::SendFaulty).unwrap();
    assert_eq!(result.reward, 8.0);
    assert!(result.terminal);
}

#[test]
fn test_invalid_line_fails_fast() {
    let mut engine = engine_with(VehicleKind::Green, 3, 2);
    engine.step(Action::Place { line: 1 }).unwrap();
    let before = engine.snapshot();

    let err = engine.step(Action::Place { line: 3 }).unwrap_err();

    assert_eq!(
        err,
        SimulationError::Routing(RoutingError::InvalidLine { line: 3, num_lines: 3 })
    );
    assert_eq!(engine.snapshot(), before, "No aging on a failed step");
    assert_eq!(engine.current_step(), 1);
}

#[test]
fn test_place_into_rework_line_rejects_non_faulty() {
    let config = OrchestratorConfig {
        rework_line: Some(2),
        ..config_with(VehicleKind::Green, 3, 4)
    };
    let mut engine = Orchestrator::new(config).unwrap();

    let result = engine.step(Action::Place { line: 2 }).unwrap();
    assert_eq!(result.reward, -5.0);
    assert!(result.terminal);
}
