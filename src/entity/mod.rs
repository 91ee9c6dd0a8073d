//! Rated entity classes: players, teams, race matchups and team-race matchups
//!
//! Classes are configuration over one shared rating model rather than separate
//! implementations.

pub mod class;
pub mod race;

// Re-export commonly used types
pub use class::{Aggregation, EntityClass, EntityClassKind, IdentityRule};
pub use race::Race;
