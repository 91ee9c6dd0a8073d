//! Match processing: canonical sequencing, the per-match pipeline, the history
//! recorder and the three-pass seeding bootstrap.

pub mod history;
pub mod processor;
pub mod seeding;
pub mod sequencer;

// Re-export commonly used types
pub use history::MatchHistory;
pub use processor::{MatchDisposition, RatingEngine, RatingState};
pub use seeding::{bootstrap, run_season, split_season, SeasonRun};
pub use sequencer::{round_rank, sequence};
