//! Rating model configuration

use crate::error::RatingError;
use serde::{Deserialize, Serialize};

/// Tunable constants of the adaptive Elo model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Starting rating for entities without a seed
    pub initial_rating: f64,
    /// Starting confidence for entities without a seed
    pub initial_confidence: f64,

    /// K-factor while prior matches <= `provisional_matches`
    pub provisional_k: f64,
    /// K-factor while prior matches <= `intermediate_matches`
    pub intermediate_k: f64,
    /// K-factor while prior matches <= `developing_matches`
    pub developing_k: f64,
    /// Lower bound of the decaying established K-factor
    pub established_k_floor: f64,
    /// Upper bound of the decaying established K-factor
    pub established_k_cap: f64,
    /// Numerator of the decay term: `floor * (1 + decay / matches)`
    pub established_k_decay: f64,

    pub provisional_matches: u32,
    pub intermediate_matches: u32,
    pub developing_matches: u32,

    /// Extra K share granted at zero confidence
    pub confidence_k_boost: f64,
    /// Maximum confidence movement per match
    pub confidence_step: f64,
    /// A prediction counts as correct when |actual - expected| is below this
    pub prediction_tolerance: f64,

    /// Lower bound for the population standard deviation
    pub min_std_dev: f64,
    /// Logistic scale = `scale_per_std_dev * std_dev`
    pub scale_per_std_dev: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: 0.0,
            initial_confidence: 0.0,
            provisional_k: 80.0,
            intermediate_k: 48.0,
            developing_k: 40.0,
            established_k_floor: 32.0,
            established_k_cap: 40.0,
            established_k_decay: 3.0,
            provisional_matches: 5,
            intermediate_matches: 10,
            developing_matches: 20,
            confidence_k_boost: 0.5,
            confidence_step: 5.0,
            prediction_tolerance: 0.01,
            min_std_dev: 100.0,
            scale_per_std_dev: 2.0,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        let k_values = [
            ("provisional_k", self.provisional_k),
            ("intermediate_k", self.intermediate_k),
            ("developing_k", self.developing_k),
            ("established_k_floor", self.established_k_floor),
            ("established_k_cap", self.established_k_cap),
        ];
        for (name, value) in k_values {
            if !(value > 0.0) {
                return Err(config_error(format!("{} must be positive", name)));
            }
        }

        if self.established_k_cap < self.established_k_floor {
            return Err(config_error(
                "established_k_cap cannot be below established_k_floor",
            ));
        }

        if self.established_k_decay < 0.0 {
            return Err(config_error("established_k_decay must be non-negative"));
        }

        if !(self.provisional_matches < self.intermediate_matches
            && self.intermediate_matches < self.developing_matches)
        {
            return Err(config_error("Match-count thresholds must be increasing"));
        }

        if self.confidence_k_boost < 0.0 {
            return Err(config_error("confidence_k_boost must be non-negative"));
        }

        if self.confidence_step < 0.0 || self.confidence_step > 100.0 {
            return Err(config_error("confidence_step must be within [0, 100]"));
        }

        if self.prediction_tolerance < 0.0 {
            return Err(config_error("prediction_tolerance must be non-negative"));
        }

        if !(self.min_std_dev > 0.0) {
            return Err(config_error("min_std_dev must be positive"));
        }

        if !(self.scale_per_std_dev > 0.0) {
            return Err(config_error("scale_per_std_dev must be positive"));
        }

        if !(0.0..=100.0).contains(&self.initial_confidence) {
            return Err(config_error("initial_confidence must be within [0, 100]"));
        }

        if !self.initial_rating.is_finite() {
            return Err(config_error("initial_rating must be finite"));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> anyhow::Error {
    RatingError::ConfigurationError {
        message: message.into(),
    }
    .into()
}
