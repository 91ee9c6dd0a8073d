//! Rating system: outcome resolution, population statistics, the adaptive Elo
//! model and per-run entity state storage.

pub mod model;
pub mod outcome;
pub mod population;
pub mod storage;

// Re-export commonly used types
pub use model::{
    AdaptiveEloModel, CalculationDetails, OpponentSnapshot, RatingInput, RatingModel,
    RatingUpdate,
};
pub use outcome::{resolve, MatchResult};
pub use population::PopulationSnapshot;
pub use storage::EntityStore;
