//! Vehicle generation
//!
//! Creates the vehicles admitted by `Place` actions, and synthetic kind
//! sequences for offline training data. All generation is deterministic given
//! the RNG seed.
//!
//! # Key Principles
//!
//! 1. **Determinism**: same seed + same distribution → same kinds
//! 2. **Sequential ids**: vehicle ids count up from 1 and are never reused
//!
//! # Example
//!
//! ```
//! use buffer_sim_core_rs::arrivals::{KindDistribution, VehicleGenerator};
//! use buffer_sim_core_rs::rng::RngManager;
//!
//! let mut rng = RngManager::new(42);
//! let mut generator = VehicleGenerator::new(KindDistribution::default());
//!
//! let kind = generator.draw_kind(&mut rng);
//! let vehicle = generator.next_vehicle(kind);
//! assert_eq!(vehicle.waiting_time(), 0);
//! ```

use crate::models::vehicle::{Vehicle, VehicleId, VehicleKind};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Distribution of kinds for newly created vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KindDistribution {
    /// Draw each kind with probability proportional to its weight
    Weighted { green: f64, faulty: f64, other: f64 },

    /// Always produce the same kind (scripted scenarios, tests)
    Fixed { kind: VehicleKind },
}

impl Default for KindDistribution {
    fn default() -> Self {
        KindDistribution::Weighted {
            green: 0.30,
            faulty: 0.20,
            other: 0.50,
        }
    }
}

impl KindDistribution {
    /// Check weights are finite, non-negative and not all zero
    pub fn validate(&self) -> Result<(), String> {
        match self {
            KindDistribution::Weighted {
                green,
                faulty,
                other,
            } => {
                let weights = [*green, *faulty, *other];
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(format!(
                        "kind weights must be finite and non-negative, got {:?}",
                        weights
                    ));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err("kind weights must not all be zero".to_string());
                }
                Ok(())
            }
            KindDistribution::Fixed { .. } => Ok(()),
        }
    }

    /// Sample one kind
    ///
    /// `Weighted` consumes one RNG draw; `Fixed` consumes none.
    pub fn sample(&self, rng: &mut RngManager) -> VehicleKind {
        match self {
            KindDistribution::Weighted {
                green,
                faulty,
                other,
            } => rng
                .weighted_index(&[*green, *faulty, *other])
                .map(|idx| VehicleKind::ALL[idx])
                // Unreachable for a validated distribution
                .unwrap_or(VehicleKind::Other),
            KindDistribution::Fixed { kind } => *kind,
        }
    }
}

/// Produces vehicles with fresh ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleGenerator {
    distribution: KindDistribution,

    /// Id handed to the next created vehicle
    next_id: u64,
}

impl VehicleGenerator {
    pub fn new(distribution: KindDistribution) -> Self {
        Self {
            distribution,
            next_id: 1,
        }
    }

    /// Resume id allocation from a checkpoint
    pub fn with_next_id(mut self, next_id: u64) -> Self {
        self.next_id = next_id.max(1);
        self
    }

    /// Id the next vehicle will receive
    pub fn peek_next_id(&self) -> u64 {
        self.next_id
    }

    /// Draw the kind for a prospective vehicle
    ///
    /// Drawing does not allocate an id, so a rejected admission leaves id
    /// allocation untouched.
    pub fn draw_kind(&self, rng: &mut RngManager) -> VehicleKind {
        self.distribution.sample(rng)
    }

    /// Create a vehicle of `kind` with the next id
    pub fn next_vehicle(&mut self, kind: VehicleKind) -> Vehicle {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        Vehicle::new(id, kind)
    }

    /// Synthetic arrival sequence of `len` kinds
    ///
    /// Used to build offline training sequences; does not allocate ids.
    pub fn generate_sequence(&self, len: usize, rng: &mut RngManager) -> Vec<VehicleKind> {
        (0..len).map(|_| self.draw_kind(rng)).collect()
    }
}
