//! Reward accountant
//!
//! Turns an [`ActionOutcome`] plus the post-step line set into a scalar
//! reward, and keeps running totals over an episode.

use crate::models::state::BufferLineSet;
use crate::models::vehicle::VehicleKind;
use crate::rewards::rates::{RewardConfig, RewardRates, RewardShaping};
use crate::routing::ActionOutcome;
use serde::{Deserialize, Serialize};

/// Reward for a single step, split by source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Flat contribution of the action itself
    pub action: f64,

    /// Penalty for vehicles waiting past the threshold (≤ 0)
    pub waiting_penalty: f64,

    /// Bonus for mean occupancy near the target (shaping only)
    pub utilization_bonus: f64,

    /// Penalty for overloaded lines (≤ 0)
    pub overload_penalty: f64,
}

impl RewardBreakdown {
    /// Step reward: sum of every term
    pub fn total(&self) -> f64 {
        self.action + self.waiting_penalty + self.utilization_bonus + self.overload_penalty
    }
}

/// Flat reward for what the action did
pub fn action_reward(outcome: &ActionOutcome, rates: &RewardRates) -> f64 {
    match outcome {
        ActionOutcome::Placed { .. } => rates.place_success,
        ActionOutcome::Rejected { .. } => rates.place_rejected,
        ActionOutcome::Cleared { kind, .. } => match kind {
            VehicleKind::Green => rates.send_green,
            VehicleKind::Faulty => rates.send_faulty,
            VehicleKind::Other => rates.send_other,
        },
        ActionOutcome::Redistributed { moves, .. } => rates.per_move * moves.len() as f64,
    }
}

/// Full reward for one step
///
/// `lines` must be the post-action, post-aging state. Every shaping term is
/// computed independently of the others.
pub fn compute_reward(
    outcome: &ActionOutcome,
    lines: &BufferLineSet,
    config: &RewardConfig,
) -> RewardBreakdown {
    let mut breakdown = RewardBreakdown {
        action: action_reward(outcome, &config.rates),
        ..RewardBreakdown::default()
    };

    if let Some(shaping) = &config.shaping {
        breakdown.waiting_penalty = waiting_penalty(lines, shaping);
        breakdown.utilization_bonus = utilization_bonus(lines, shaping);
        breakdown.overload_penalty = overload_penalty(lines, shaping);
    }

    breakdown
}

fn waiting_penalty(lines: &BufferLineSet, shaping: &RewardShaping) -> f64 {
    let overdue = lines.count_where(|v| v.waiting_time() > shaping.min_waiting_time);
    -shaping.waiting_penalty_per_vehicle * overdue as f64
}

fn utilization_bonus(lines: &BufferLineSet, shaping: &RewardShaping) -> f64 {
    let deviation = (lines.utilization() - shaping.target_utilization).abs();
    shaping.utilization_bonus_scale * (1.0 - deviation)
}

fn overload_penalty(lines: &BufferLineSet, shaping: &RewardShaping) -> f64 {
    let overloaded = lines
        .lines()
        .iter()
        .filter(|line| line.occupancy_ratio() > shaping.high_occupancy_threshold)
        .count();
    -shaping.overload_penalty_per_line * overloaded as f64
}

/// Running totals over one episode
///
/// Reset together with the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    pub steps: usize,
    pub total_reward: f64,
    pub placed: usize,
    pub rejected: usize,
    pub evicted_green: usize,
    pub evicted_faulty: usize,
    pub evicted_other: usize,
    pub moves: usize,

    /// Highest single-line occupancy ratio seen after any step
    pub peak_occupancy: f64,
}

impl EpisodeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one step into the totals
    pub fn record(&mut self, outcome: &ActionOutcome, reward: &RewardBreakdown, lines: &BufferLineSet) {
        self.steps += 1;
        self.total_reward += reward.total();

        match outcome {
            ActionOutcome::Placed { .. } => self.placed += 1,
            ActionOutcome::Rejected { .. } => self.rejected += 1,
            ActionOutcome::Cleared { kind, evicted } => match kind {
                VehicleKind::Green => self.evicted_green += evicted,
                VehicleKind::Faulty => self.evicted_faulty += evicted,
                VehicleKind::Other => self.evicted_other += evicted,
            },
            ActionOutcome::Redistributed { moves, .. } => self.moves += moves.len(),
        }

        self.peak_occupancy = self.peak_occupancy.max(lines.peak_occupancy());
    }

    pub fn total_evicted(&self) -> usize {
        self.evicted_green + self.evicted_faulty + self.evicted_other
    }
}
