//! xorshift64* random number generator
//!
//! Every random decision in the buffer simulation (vehicle kind draws on
//! `Place`, target-line draws on `MoveWithinBuffer`) is sourced from one
//! `RngManager` owned by the engine.
//!
//! # Determinism
//!
//! Same seed → same sequence. Planners that branch or replay rollouts rely on
//! this, and so do the scenario tests.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use buffer_sim_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let line = rng.index(12); // [0, 12)
/// assert!(line < 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1, since xorshift never leaves the zero state.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform index in [0, len)
    ///
    /// # Panics
    /// Panics if `len == 0`
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot draw an index from an empty range");
        (self.next() % len as u64) as usize
    }

    /// Draw an index with probability proportional to `weights[i]`
    ///
    /// Consumes exactly one value from the stream regardless of the weights,
    /// so a trajectory stays aligned when the distribution changes. Returns
    /// `None` when the weights sum to zero.
    ///
    /// # Example
    /// ```
    /// use buffer_sim_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// assert_eq!(rng.weighted_index(&[0.0, 1.0, 0.0]), Some(1));
    /// assert_eq!(rng.weighted_index(&[0.0, 0.0]), None);
    /// ```
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().sum();
        let draw = self.next_f64();
        if total <= 0.0 {
            return None;
        }

        let mut target = draw * total;
        let mut last_positive = None;
        for (idx, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            last_positive = Some(idx);
            if target < *weight {
                return Some(idx);
            }
            target -= weight;
        }

        // Float rounding can leave a sliver past the final bucket
        last_positive
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// `RngManager::new(state)` resumes the exact same stream.
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn test_index_empty_range() {
        let mut rng = RngManager::new(12345);
        rng.index(0);
    }

    #[test]
    fn test_index_stays_in_bounds() {
        let mut rng = RngManager::new(2024);
        for _ in 0..1000 {
            assert!(rng.index(12) < 12);
        }
    }

    #[test]
    fn test_weighted_index_skips_zero_weights() {
        let mut rng = RngManager::new(99);
        for _ in 0..500 {
            let idx = rng.weighted_index(&[0.3, 0.0, 0.7]).unwrap();
            assert_ne!(idx, 1, "zero-weight bucket must never be drawn");
        }
    }

    #[test]
    fn test_weighted_index_consumes_one_draw() {
        let mut a = RngManager::new(5);
        let mut b = RngManager::new(5);
        a.weighted_index(&[0.0, 0.0, 0.0]);
        b.next();
        assert_eq!(a, b);
    }

    #[test]
    fn test_weighted_index_roughly_follows_weights() {
        let mut rng = RngManager::new(31337);
        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            counts[rng.weighted_index(&[0.3, 0.2, 0.5]).unwrap()] += 1;
        }
        assert!((2_600..3_400).contains(&counts[0]), "green share {:?}", counts);
        assert!((1_600..2_400).contains(&counts[1]), "faulty share {:?}", counts);
        assert!((4_600..5_400).contains(&counts[2]), "other share {:?}", counts);
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                (0.0..1.0).contains(&val),
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }
}
