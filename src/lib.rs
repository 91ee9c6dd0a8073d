//! Duo Ladder - incremental skill ratings for small 2v2 tournament circuits
//!
//! This crate rates players, two-person teams, race matchups and team-race
//! matchups from a chronological stream of match results. It stays stable on
//! very small datasets through an adaptive K-factor, a population-relative
//! win probability and a three-pass seeding bootstrap for cold-start seasons.
//! The engine performs no network or storage I/O: it consumes match records and
//! seeds and returns entity states plus a per-match audit trail.

pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod intake;
pub mod rating;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use engine::{RatingEngine, RatingState};
pub use entity::{EntityClass, EntityClassKind};
pub use rating::{AdaptiveEloModel, RatingModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
