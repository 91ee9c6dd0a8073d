//! Population statistics over all known ratings
//!
//! The standard deviation of the current population replaces the fixed Elo
//! divisor, so it must never be zero. Values below the configured floor are
//! raised to the floor, which also covers populations of fewer than two entities.

use serde::{Deserialize, Serialize};

/// Mean and floored sample standard deviation of the current ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation before flooring; zero below two entities
    pub raw_std_dev: f64,
    /// Standard deviation used by the rating model, at least the floor
    pub std_dev: f64,
}

impl PopulationSnapshot {
    /// Compute statistics over the given ratings.
    ///
    /// Iteration order affects the last bits of the sums, so callers pass ratings
    /// in a stable order.
    pub fn from_ratings<I>(ratings: I, min_std_dev: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let ratings: Vec<f64> = ratings.into_iter().collect();
        let count = ratings.len();

        let mean = if count == 0 {
            0.0
        } else {
            ratings.iter().sum::<f64>() / count as f64
        };

        let raw_std_dev = if count < 2 {
            0.0
        } else {
            let squared: f64 = ratings.iter().map(|r| (r - mean).powi(2)).sum();
            (squared / (count - 1) as f64).sqrt()
        };

        Self {
            count,
            mean,
            raw_std_dev,
            std_dev: raw_std_dev.max(min_std_dev),
        }
    }

    /// Whether the floor replaced the measured spread
    pub fn is_floored(&self) -> bool {
        self.raw_std_dev < self.std_dev
    }
}
