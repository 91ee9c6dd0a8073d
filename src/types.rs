//! Common types used throughout the rating engine

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a rated entity, unique within its entity class
pub type EntityId = String;

/// Unique identifier of a match record
pub type MatchId = String;

/// Lower and upper bound of an entity's confidence
pub const CONFIDENCE_MIN: f64 = 0.0;
pub const CONFIDENCE_MAX: f64 = 100.0;

/// Current rating state for a rated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub rating: f64,
    /// Always within [0, 100]
    pub confidence: f64,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
}

impl EntityState {
    /// Create a fresh entity with no match history
    pub fn new(rating: f64, confidence: f64) -> Self {
        Self {
            rating,
            confidence: clamp_confidence(confidence),
            matches: 0,
            wins: 0,
            losses: 0,
        }
    }

    /// Number of drawn matches
    pub fn draws(&self) -> u32 {
        self.matches
            .saturating_sub(self.wins)
            .saturating_sub(self.losses)
    }
}

impl Default for EntityState {
    fn default() -> Self {
        Self::new(0.0, CONFIDENCE_MIN)
    }
}

/// Clamp a confidence value into [0, 100]
pub fn clamp_confidence(confidence: f64) -> f64 {
    confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

/// Starting state supplied for an entity before a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub rating: f64,
    #[serde(default)]
    pub confidence: f64,
}

impl Seed {
    /// Seed carrying only a starting rating
    pub fn rating_only(rating: f64) -> Self {
        Self {
            rating,
            confidence: CONFIDENCE_MIN,
        }
    }
}

/// Seed map keyed by entity identifier; ordered so replays are reproducible
pub type SeedMap = BTreeMap<EntityId, Seed>;

/// Result of a match from one participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Actual score fed into the rating model
    pub fn actual_score(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
        }
    }

    /// The same result seen from the opposing side
    pub fn reversed(self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Which side of a match a participant played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideLabel {
    A,
    B,
}

/// Validated, immutable match input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: MatchId,
    pub tournament_date: NaiveDate,
    #[serde(default)]
    pub match_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub round: String,
    /// One or two underlying identifiers per side
    pub side_a: Vec<EntityId>,
    pub side_b: Vec<EntityId>,
    pub score_a: u32,
    pub score_b: u32,
}

impl MatchRecord {
    /// Create a match record without a match date or round label
    pub fn new(
        match_id: impl Into<MatchId>,
        tournament_date: NaiveDate,
        side_a: Vec<EntityId>,
        side_b: Vec<EntityId>,
        score_a: u32,
        score_b: u32,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            tournament_date,
            match_date: None,
            round: String::new(),
            side_a,
            side_b,
            score_a,
            score_b,
        }
    }

    /// Set the round label
    pub fn with_round(mut self, round: impl Into<String>) -> Self {
        self.round = round.into();
        self
    }

    /// Set the intra-tournament match date
    pub fn with_match_date(mut self, match_date: NaiveDateTime) -> Self {
        self.match_date = Some(match_date);
        self
    }

    /// Members of the requested side
    pub fn side(&self, label: SideLabel) -> &[EntityId] {
        match label {
            SideLabel::A => &self.side_a,
            SideLabel::B => &self.side_b,
        }
    }
}

/// Before/after snapshot of one participant in one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub entity_id: EntityId,
    pub side: SideLabel,
    pub outcome: Outcome,
    pub rating_before: f64,
    /// 1-based rank among all known entities before the update
    pub rank_before: usize,
    pub confidence_before: f64,
    pub rating_after: f64,
    pub confidence_after: f64,
    pub delta: f64,
    pub win_probability: f64,
    pub base_k: f64,
    pub k_factor: f64,
}

/// Audit trail entry for one processed match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHistoryEntry {
    /// Position of the match within the run
    pub sequence: u64,
    pub match_id: MatchId,
    pub tournament_date: NaiveDate,
    pub round: String,
    pub participants: Vec<ParticipantRecord>,
}

/// Final entity states and audit trail of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub entities: BTreeMap<EntityId, EntityState>,
    pub history: Vec<MatchHistoryEntry>,
}
