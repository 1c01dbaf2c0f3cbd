//! Reward accounting
//!
//! This module provides:
//! - Reward rate configuration (`RewardRates`, `RewardShaping`, `RewardConfig`)
//! - The per-step accountant (`compute_reward` → `RewardBreakdown`)
//! - Running episode totals (`EpisodeMetrics`)
//!
//! # Reward composition
//!
//! ```text
//! reward = action contribution                 (always)
//!        + waiting penalty                     (shaping only)
//!        + utilization bonus                   (shaping only)
//!        + overload penalty                    (shaping only)
//! ```
//!
//! Shaping terms read the post-action, post-aging line set.

pub mod accountant;
pub mod rates;

// Re-exports
pub use accountant::{action_reward, compute_reward, EpisodeMetrics, RewardBreakdown};
pub use rates::{RewardConfig, RewardRates, RewardShaping};
