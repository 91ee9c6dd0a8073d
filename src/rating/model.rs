//! Adaptive Elo rating model
//!
//! This module defines the interface used by the engine to turn one match result
//! into a rating update, and the adaptive Elo implementation:
//!
//! 1. a base K-factor chosen from the entity's prior match count,
//! 2. a confidence adjustment granting up to 50% more K at zero confidence,
//! 3. a logistic win probability whose scale follows the population spread,
//! 4. `delta = K * (actual - expected)`, applied without clamping,
//! 5. a confidence nudge toward 100 when the prediction was correct and toward 0 otherwise.

use crate::config::RatingConfig;
use crate::rating::population::PopulationSnapshot;
use crate::types::{clamp_confidence, EntityState, Outcome};
use serde::{Deserialize, Serialize};

/// Aggregated view of the opposing side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentSnapshot {
    pub rating: f64,
    pub confidence: f64,
    /// Average prior match count across the side
    pub matches: f64,
}

/// Everything the model needs to rate one participant in one match
#[derive(Debug, Clone, PartialEq)]
pub struct RatingInput<'a> {
    pub own: &'a EntityState,
    pub opponent: OpponentSnapshot,
    pub population: PopulationSnapshot,
    pub outcome: Outcome,
}

/// Intermediate values kept for the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationDetails {
    pub base_k: f64,
    pub k_factor: f64,
    pub win_probability: f64,
    pub delta: f64,
    pub prediction_correct: bool,
}

/// New entity state plus how it was computed
#[derive(Debug, Clone, PartialEq)]
pub struct RatingUpdate {
    pub state: EntityState,
    pub details: CalculationDetails,
}

/// Trait for converting a match outcome into a rating update
pub trait RatingModel: Send + Sync {
    /// Rate one participant. Must be a pure function of its input.
    fn rate(&self, input: &RatingInput<'_>) -> RatingUpdate;

    /// State for entities entering without a seed
    fn initial_state(&self) -> EntityState;

    /// Floor applied to the population standard deviation
    fn min_std_dev(&self) -> f64;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Elo with a match-count K schedule, confidence-scaled K and a population-relative scale
#[derive(Debug, Clone)]
pub struct AdaptiveEloModel {
    config: RatingConfig,
}

impl AdaptiveEloModel {
    /// Create a new model after validating its configuration
    pub fn new(config: RatingConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Base K-factor for an entity with `matches` prior matches
    pub fn base_k_factor(&self, matches: u32) -> f64 {
        let c = &self.config;
        if matches <= c.provisional_matches {
            c.provisional_k
        } else if matches <= c.intermediate_matches {
            c.intermediate_k
        } else if matches <= c.developing_matches {
            c.developing_k
        } else {
            let decayed = c.established_k_floor * (1.0 + c.established_k_decay / matches as f64);
            decayed.min(c.established_k_cap).max(c.established_k_floor)
        }
    }

    /// Scale K up for entities the system is unsure about
    pub fn adjusted_k_factor(&self, base_k: f64, confidence: f64) -> f64 {
        let uncertainty = (100.0 - clamp_confidence(confidence)) / 100.0;
        base_k * (1.0 + uncertainty * self.config.confidence_k_boost)
    }

    /// Logistic divisor derived from the population spread
    pub fn logistic_scale(&self, population: &PopulationSnapshot) -> f64 {
        self.config.scale_per_std_dev * population.std_dev.max(self.config.min_std_dev)
    }

    /// Probability that `own_rating` beats `opponent_rating`
    pub fn win_probability(
        &self,
        own_rating: f64,
        opponent_rating: f64,
        population: &PopulationSnapshot,
    ) -> f64 {
        let scale = self.logistic_scale(population);
        1.0 / (1.0 + 10f64.powf((opponent_rating - own_rating) / scale))
    }

    /// Move confidence toward 100 on a correct prediction and toward 0 otherwise
    pub fn update_confidence(&self, confidence: f64, actual: f64, expected: f64) -> (f64, bool) {
        let step = self.config.confidence_step;
        let correct = (actual - expected).abs() < self.config.prediction_tolerance;
        let updated = if correct {
            confidence + step * (1.0 - confidence / 100.0)
        } else {
            confidence - step * (confidence / 100.0)
        };
        (clamp_confidence(updated), correct)
    }
}

impl RatingModel for AdaptiveEloModel {
    fn rate(&self, input: &RatingInput<'_>) -> RatingUpdate {
        let own = input.own;
        let base_k = self.base_k_factor(own.matches);
        let k_factor = self.adjusted_k_factor(base_k, own.confidence);
        let win_probability =
            self.win_probability(own.rating, input.opponent.rating, &input.population);

        let actual = input.outcome.actual_score();
        let delta = k_factor * (actual - win_probability);
        let (confidence, prediction_correct) =
            self.update_confidence(own.confidence, actual, win_probability);

        let mut state = own.clone();
        state.rating += delta;
        state.confidence = confidence;
        state.matches += 1;
        match input.outcome {
            Outcome::Win => state.wins += 1,
            Outcome::Loss => state.losses += 1,
            Outcome::Draw => {}
        }

        RatingUpdate {
            state,
            details: CalculationDetails {
                base_k,
                k_factor,
                win_probability,
                delta,
                prediction_correct,
            },
        }
    }

    fn initial_state(&self) -> EntityState {
        EntityState::new(self.config.initial_rating, self.config.initial_confidence)
    }

    fn min_std_dev(&self) -> f64 {
        self.config.min_std_dev
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}
