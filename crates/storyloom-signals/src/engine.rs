//! Arc signal computation.
//!
//! A pure function of an arc's story timestamps and "now". Never
//! persisted; recomputed on every read so signals are always live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyloom_core::error::DomainError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Coarse activity-rate classification for an arc.
///
/// Variants are ordered by activity so `Rising > Steady > Stalling >
/// Dormant` holds for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    /// No additions beyond the stalling horizon.
    Dormant,
    /// Last addition between the steady and stalling horizons.
    Stalling,
    /// Last addition within the steady horizon.
    Steady,
    /// Several additions within the rising window.
    Rising,
}

/// Live, derived signals for one arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcSignal {
    /// Activity classification.
    pub momentum: Momentum,
    /// Normalized [0, 1] composite of momentum, story count, and recency.
    pub health: f64,
    /// Fractional days since the most recent story.
    pub days_since_last: f64,
}

/// Tunable signal parameters. Horizons must stay monotonic in recency.
#[derive(Debug, Clone, Copy)]
pub struct SignalConfig {
    /// Window for counting recent additions toward Rising.
    pub rising_window_days: f64,
    /// Minimum additions inside the rising window for Rising.
    pub rising_min_stories: usize,
    /// Most recent addition at most this old: Steady.
    pub steady_horizon_days: f64,
    /// Most recent addition at most this old: Stalling; beyond: Dormant.
    pub stalling_horizon_days: f64,
    /// Story count at which the count factor saturates to 1.
    pub count_saturation: usize,
    /// Half-life of the recency decay, in days.
    pub recency_half_life_days: f64,
    /// Weight of the momentum tier in the health composite.
    pub momentum_weight: f64,
    /// Weight of the story count in the health composite.
    pub count_weight: f64,
    /// Weight of recency in the health composite.
    pub recency_weight: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rising_window_days: 3.0,
            rising_min_stories: 2,
            steady_horizon_days: 10.0,
            stalling_horizon_days: 21.0,
            count_saturation: 10,
            recency_half_life_days: 10.0,
            momentum_weight: 0.5,
            count_weight: 0.2,
            recency_weight: 0.3,
        }
    }
}

impl SignalConfig {
    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when horizons are not strictly
    /// increasing or any weight/denominator is non-positive.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.rising_window_days > 0.0
            && self.rising_window_days < self.steady_horizon_days
            && self.steady_horizon_days < self.stalling_horizon_days)
        {
            return Err(DomainError::Validation(
                "momentum horizons must be strictly increasing in staleness".to_owned(),
            ));
        }
        if self.rising_min_stories < 2 {
            return Err(DomainError::Validation(
                "rising requires at least two recent stories".to_owned(),
            ));
        }
        if self.count_saturation == 0
            || self.recency_half_life_days <= 0.0
            || self.momentum_weight <= 0.0
            || self.count_weight <= 0.0
            || self.recency_weight <= 0.0
        {
            return Err(DomainError::Validation(
                "signal weights and denominators must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    fn tier_weight(momentum: Momentum) -> f64 {
        match momentum {
            Momentum::Rising => 1.0,
            Momentum::Steady => 0.75,
            Momentum::Stalling => 0.4,
            Momentum::Dormant => 0.1,
        }
    }
}

/// Computes the live signal for an arc from its story timestamps.
///
/// Returns `None` for an empty slice; a persisted arc always holds at
/// least one story, so `None` only ever means bad input.
#[must_use]
pub fn compute_signal(
    config: &SignalConfig,
    story_times: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> Option<ArcSignal> {
    let last = story_times.iter().max()?;
    let days_since_last =
        ((now - *last).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);

    let recent = story_times
        .iter()
        .filter(|&&t| {
            let age = (now - t).num_seconds() as f64 / SECONDS_PER_DAY;
            (0.0..=config.rising_window_days).contains(&age)
        })
        .count();

    let momentum = if recent >= config.rising_min_stories {
        Momentum::Rising
    } else if days_since_last <= config.steady_horizon_days {
        Momentum::Steady
    } else if days_since_last <= config.stalling_horizon_days {
        Momentum::Stalling
    } else {
        Momentum::Dormant
    };

    #[allow(clippy::cast_precision_loss)]
    let count_factor =
        (story_times.len() as f64 / config.count_saturation as f64).min(1.0);
    let recency_factor =
        (-days_since_last * std::f64::consts::LN_2 / config.recency_half_life_days).exp();
    let total = config.momentum_weight + config.count_weight + config.recency_weight;
    let health = ((config.momentum_weight * SignalConfig::tier_weight(momentum)
        + config.count_weight * count_factor
        + config.recency_weight * recency_factor)
        / total)
        .clamp(0.0, 1.0);

    Some(ArcSignal {
        momentum,
        health,
        days_since_last,
    })
}
