//! Step counting for the simulation
//!
//! The engine advances in discrete steps, one per applied action. Steps are
//! grouped into episodes; `reset` closes the current episode and starts the
//! next one at step 0.

use serde::{Deserialize, Serialize};

/// Tracks the step within the current episode and totals across episodes
///
/// # Example
/// ```
/// use buffer_sim_core_rs::StepClock;
///
/// let mut clock = StepClock::new();
/// clock.advance_step();
/// clock.advance_step();
/// assert_eq!(clock.current_step(), 2);
///
/// clock.start_episode();
/// assert_eq!(clock.current_step(), 0);
/// assert_eq!(clock.episode(), 1);
/// assert_eq!(clock.total_steps(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepClock {
    /// Steps taken in the current episode
    current_step: usize,
    /// Episodes started since construction (0 for the first one)
    episode: usize,
    /// Steps taken across all episodes
    total_steps: usize,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a clock from checkpointed counters
    pub fn from_parts(current_step: usize, episode: usize, total_steps: usize) -> Self {
        Self {
            current_step,
            episode,
            total_steps,
        }
    }

    /// Advance by one step
    pub fn advance_step(&mut self) {
        self.current_step += 1;
        self.total_steps += 1;
    }

    /// Begin a new episode at step 0
    ///
    /// The very first `reset` on a fresh clock does not count as a new
    /// episode when no step has been taken yet.
    pub fn start_episode(&mut self) {
        if self.current_step > 0 {
            self.episode += 1;
        }
        self.current_step = 0;
    }

    /// Steps taken in the current episode
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Episode number (0-indexed)
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Steps taken since construction
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }
}
