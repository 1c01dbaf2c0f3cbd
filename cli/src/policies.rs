//! Baseline policies for rollouts

use buffer_sim_core_rs::{Action, Orchestrator, RngManager, VehicleKind};
use clap::ValueEnum;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PolicyArg {
    /// Uniform over the action space
    Random,
    /// Clear what can be cleared, otherwise fill the emptiest line
    Greedy,
}

/// Chooses the next action from the engine's current state
pub trait Policy {
    fn choose(&mut self, engine: &Orchestrator) -> Action;
}

pub fn build(policy: PolicyArg, seed: u64) -> Box<dyn Policy> {
    match policy {
        PolicyArg::Random => Box::new(RandomPolicy::new(seed)),
        PolicyArg::Greedy => Box::new(GreedyPolicy),
    }
}

/// Draws from its own RNG so the engine's stream is not disturbed
pub struct RandomPolicy {
    rng: RngManager,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        // Offset so the policy and engine streams differ under the same --seed
        Self {
            rng: RngManager::new(seed ^ 0x9E37_79B9_7F4A_7C15),
        }
    }
}

impl Policy for RandomPolicy {
    fn choose(&mut self, engine: &Orchestrator) -> Action {
        let num_lines = engine.lines().num_lines();
        let index = self.rng.index(engine.num_actions());
        Action::from_index(index, num_lines).unwrap_or(Action::SendGreen)
    }
}

pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn choose(&mut self, engine: &Orchestrator) -> Action {
        let lines = engine.lines();

        if lines.count_kind(VehicleKind::Green) > 0 {
            return Action::SendGreen;
        }
        if lines.count_kind(VehicleKind::Faulty) > 0 {
            return Action::SendFaulty;
        }

        let release_age = engine.config().other_release_age;
        if lines.count_where(|v| v.kind() == VehicleKind::Other && v.waiting_time() >= release_age) > 0 {
            return Action::SendOther;
        }

        // Emptiest standard line by occupancy ratio; ties go to the lowest index
        let target = lines
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| line.accepts(VehicleKind::Green))
            .min_by(|(_, a), (_, b)| a.occupancy_ratio().total_cmp(&b.occupancy_ratio()))
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        Action::Place { line: target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buffer_sim_core_rs::{KindDistribution, OrchestratorConfig};

    #[test]
    fn test_greedy_places_into_empty_buffer() {
        let engine = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        assert_eq!(GreedyPolicy.choose(&engine), Action::Place { line: 0 });
    }

    #[test]
    fn test_greedy_sends_green_when_present() {
        let config = OrchestratorConfig {
            kind_distribution: KindDistribution::Fixed {
                kind: VehicleKind::Green,
            },
            ..OrchestratorConfig::default()
        };
        let mut engine = Orchestrator::new(config).unwrap();
        engine.step(Action::Place { line: 0 }).unwrap();
        assert_eq!(GreedyPolicy.choose(&engine), Action::SendGreen);
    }

    #[test]
    fn test_greedy_skips_rework_line_when_placing() {
        let config = OrchestratorConfig {
            num_lines: 3,
            rework_line: Some(0),
            ..OrchestratorConfig::default()
        };
        let engine = Orchestrator::new(config).unwrap();
        assert_eq!(GreedyPolicy.choose(&engine), Action::Place { line: 1 });
    }

    #[test]
    fn test_random_policy_stays_in_action_space() {
        let engine = Orchestrator::new(OrchestratorConfig::default()).unwrap();
        let mut policy = RandomPolicy::new(3);
        for _ in 0..200 {
            let action = policy.choose(&engine);
            assert!(action.to_index(12) < engine.num_actions());
        }
    }
}
