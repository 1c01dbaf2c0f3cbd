//! Reward Rates and Shaping Parameters
//!
//! Flat per-action rewards plus the optional continuous shaping terms.

use serde::{Deserialize, Serialize};

/// Flat reward contribution of each action
///
/// Defaults reproduce the reference reward table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardRates {
    /// Successful `Place`
    pub place_success: f64,

    /// `Place` refused by a full line
    pub place_rejected: f64,

    /// `SendGreen`, regardless of how many vehicles left
    pub send_green: f64,

    /// `SendFaulty`, regardless of how many vehicles left
    pub send_faulty: f64,

    /// `SendOther`, regardless of how many vehicles left
    pub send_other: f64,

    /// Per successful move during `MoveWithinBuffer`
    pub per_move: f64,
}

impl Default for RewardRates {
    fn default() -> Self {
        Self {
            place_success: 1.0,
            place_rejected: -5.0,
            send_green: 10.0,
            send_faulty: 8.0,
            send_other: 5.0,
            per_move: 2.0,
        }
    }
}

/// Continuous reward terms of the extended variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    /// Vehicles waiting strictly longer than this are penalized
    pub min_waiting_time: u32,

    /// Penalty per over-waiting vehicle (applied as a negative term)
    pub waiting_penalty_per_vehicle: f64,

    /// Mean per-line occupancy ratio that earns the full bonus (0.0..=1.0)
    pub target_utilization: f64,

    /// Bonus at exactly the target ratio; falls off linearly with |deviation|
    pub utilization_bonus_scale: f64,

    /// Occupancy ratio above which a line counts as overloaded
    pub high_occupancy_threshold: f64,

    /// Penalty per overloaded line (applied as a negative term)
    pub overload_penalty_per_line: f64,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            min_waiting_time: 5,
            waiting_penalty_per_vehicle: 0.1,
            target_utilization: 0.6,
            utilization_bonus_scale: 1.0,
            high_occupancy_threshold: 0.9,
            overload_penalty_per_line: 1.0,
        }
    }
}

impl RewardShaping {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.target_utilization) {
            return Err(format!(
                "target_utilization must be within [0, 1], got {}",
                self.target_utilization
            ));
        }
        if !(0.0..=1.0).contains(&self.high_occupancy_threshold) {
            return Err(format!(
                "high_occupancy_threshold must be within [0, 1], got {}",
                self.high_occupancy_threshold
            ));
        }
        let scalars = [
            self.waiting_penalty_per_vehicle,
            self.utilization_bonus_scale,
            self.overload_penalty_per_line,
        ];
        if scalars.iter().any(|v| !v.is_finite()) {
            return Err("shaping coefficients must be finite".to_string());
        }
        Ok(())
    }
}

/// Complete reward configuration
///
/// `shaping: None` is the basic variant (action rewards only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub rates: RewardRates,
    pub shaping: Option<RewardShaping>,
}

impl RewardConfig {
    /// Extended variant with default shaping parameters
    pub fn extended() -> Self {
        Self {
            rates: RewardRates::default(),
            shaping: Some(RewardShaping::default()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let r = &self.rates;
        let flat = [
            r.place_success,
            r.place_rejected,
            r.send_green,
            r.send_faulty,
            r.send_other,
            r.per_move,
        ];
        if flat.iter().any(|v| !v.is_finite()) {
            return Err("reward rates must be finite".to_string());
        }
        match &self.shaping {
            Some(shaping) => shaping.validate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates_match_reward_table() {
        let rates = RewardRates::default();
        assert_eq!(rates.place_success, 1.0);
        assert_eq!(rates.place_rejected, -5.0);
        assert_eq!(rates.send_green, 10.0);
        assert_eq!(rates.send_faulty, 8.0);
        assert_eq!(rates.send_other, 5.0);
        assert_eq!(rates.per_move, 2.0);
    }

    #[test]
    fn test_default_config_is_basic_variant() {
        assert!(RewardConfig::default().shaping.is_none());
        assert!(RewardConfig::extended().shaping.is_some());
    }

    #[test]
    fn test_shaping_rejects_out_of_range_target() {
        let shaping = RewardShaping {
            target_utilization: 1.5,
            ..RewardShaping::default()
        };
        assert!(shaping.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RewardConfig =
            serde_json::from_str(r#"{"rates": {"send_green": 12.0}, "shaping": {"target_utilization": 0.5}}"#)
                .unwrap();
        assert_eq!(config.rates.send_green, 12.0);
        assert_eq!(config.rates.send_faulty, 8.0);
        let shaping = config.shaping.unwrap();
        assert_eq!(shaping.target_utilization, 0.5);
        assert_eq!(shaping.min_waiting_time, 5);
    }

    #[test]
    fn test_non_finite_rate_rejected() {
        let config = RewardConfig {
            rates: RewardRates {
                per_move: f64::NAN,
                ..RewardRates::default()
            },
            shaping: None,
        };
        assert!(config.validate().is_err());
    }
}
