//! Entity class configuration
//!
//! Every competitor class runs through the same rating model. A class only decides
//! how a side's raw identifiers map to rated entities and how the opposing side is
//! collapsed into a single opponent.

use crate::entity::race;
use crate::error::RatingError;
use crate::rating::model::OpponentSnapshot;
use crate::types::{EntityId, EntityState, MatchId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum number of raw identifiers on one side
pub const MAX_SIDE_SIZE: usize = 2;

/// Built-in entity classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityClassKind {
    Player,
    Team,
    Race,
    TeamRace,
}

impl FromStr for EntityClassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "player" => Ok(EntityClassKind::Player),
            "team" => Ok(EntityClassKind::Team),
            "race" => Ok(EntityClassKind::Race),
            "team-race" => Ok(EntityClassKind::TeamRace),
            other => Err(format!("Unknown entity class: {}", other)),
        }
    }
}

impl std::fmt::Display for EntityClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityClassKind::Player => write!(f, "player"),
            EntityClassKind::Team => write!(f, "team"),
            EntityClassKind::Race => write!(f, "race"),
            EntityClassKind::TeamRace => write!(f, "team-race"),
        }
    }
}

/// How a side's raw identifiers become rated entity identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityRule {
    /// Every member is rated on its own
    Individual,
    /// The side is one entity: members sorted and joined with `separator`
    Combined { separator: String },
    /// The side is one entity: its sorted race codes, e.g. `PZ`
    RaceComposition,
    /// Members are `player:race`; the side is `p1+p2@RACES`
    TeamRace,
}

/// How the opposing side is collapsed into a single opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Arithmetic mean of the side's ratings, confidences and match counts
    Mean,
    /// The highest-rated member of the side
    Strongest,
}

/// Configuration of one rated entity class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityClass {
    pub kind: EntityClassKind,
    pub identity: IdentityRule,
    pub aggregation: Aggregation,
}

impl EntityClass {
    /// Individual players rated against the mean of the opposing side
    pub fn player() -> Self {
        Self {
            kind: EntityClassKind::Player,
            identity: IdentityRule::Individual,
            aggregation: Aggregation::Mean,
        }
    }

    /// Two-person teams, keyed by sorted member identifiers
    pub fn team() -> Self {
        Self {
            kind: EntityClassKind::Team,
            identity: IdentityRule::Combined {
                separator: "+".to_string(),
            },
            aggregation: Aggregation::Mean,
        }
    }

    /// Race matchups, keyed by sorted race codes
    pub fn race() -> Self {
        Self {
            kind: EntityClassKind::Race,
            identity: IdentityRule::RaceComposition,
            aggregation: Aggregation::Mean,
        }
    }

    /// Team plus race composition
    pub fn team_race() -> Self {
        Self {
            kind: EntityClassKind::TeamRace,
            identity: IdentityRule::TeamRace,
            aggregation: Aggregation::Mean,
        }
    }

    pub fn from_kind(kind: EntityClassKind) -> Self {
        match kind {
            EntityClassKind::Player => Self::player(),
            EntityClassKind::Team => Self::team(),
            EntityClassKind::Race => Self::race(),
            EntityClassKind::TeamRace => Self::team_race(),
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Rated entities standing for one side of a match.
    ///
    /// Fails for structurally invalid sides: no members, more than two members,
    /// blank or repeated identifiers, or members the identity rule cannot parse.
    pub fn participants(
        &self,
        match_id: &MatchId,
        members: &[EntityId],
    ) -> crate::error::Result<Vec<EntityId>> {
        if members.is_empty() {
            return Err(invalid_side(match_id, "Side has no entities"));
        }

        if members.len() > MAX_SIDE_SIZE {
            return Err(invalid_side(
                match_id,
                format!(
                    "Side has {} entities, at most {} allowed",
                    members.len(),
                    MAX_SIDE_SIZE
                ),
            ));
        }

        let mut trimmed: Vec<&str> = members.iter().map(|m| m.trim()).collect();
        if trimmed.iter().any(|m| m.is_empty()) {
            return Err(invalid_side(match_id, "Entity identifier cannot be empty"));
        }

        match &self.identity {
            IdentityRule::Individual => {
                reject_repeats(match_id, &trimmed)?;
                Ok(trimmed.into_iter().map(str::to_string).collect())
            }
            IdentityRule::Combined { separator } => {
                reject_repeats(match_id, &trimmed)?;
                trimmed.sort_unstable();
                Ok(vec![trimmed.join(separator)])
            }
            IdentityRule::RaceComposition => {
                let id = race::composition(&trimmed)
                    .map_err(|reason| invalid_side(match_id, reason))?;
                Ok(vec![id])
            }
            IdentityRule::TeamRace => {
                let mut players = Vec::with_capacity(trimmed.len());
                let mut races = Vec::with_capacity(trimmed.len());
                for member in &trimmed {
                    let (player, race_name) = member.rsplit_once(':').ok_or_else(|| {
                        invalid_side(match_id, format!("Expected player:race, got {}", member))
                    })?;
                    let player = player.trim();
                    if player.is_empty() {
                        return Err(invalid_side(match_id, "Entity identifier cannot be empty"));
                    }
                    players.push(player);
                    races.push(race_name);
                }
                reject_repeats(match_id, &players)?;
                players.sort_unstable();
                let races = race::composition(&races)
                    .map_err(|reason| invalid_side(match_id, reason))?;
                Ok(vec![format!("{}@{}", players.join("+"), races)])
            }
        }
    }

    /// Collapse the opposing side's states into one opponent
    pub fn aggregate(&self, side: &[&EntityState]) -> OpponentSnapshot {
        if side.is_empty() {
            return OpponentSnapshot {
                rating: 0.0,
                confidence: 0.0,
                matches: 0.0,
            };
        }

        match self.aggregation {
            Aggregation::Mean => {
                let n = side.len() as f64;
                OpponentSnapshot {
                    rating: side.iter().map(|s| s.rating).sum::<f64>() / n,
                    confidence: side.iter().map(|s| s.confidence).sum::<f64>() / n,
                    matches: side.iter().map(|s| s.matches as f64).sum::<f64>() / n,
                }
            }
            Aggregation::Strongest => {
                let mut strongest = side[0];
                for state in &side[1..] {
                    if state.rating > strongest.rating {
                        strongest = *state;
                    }
                }
                OpponentSnapshot {
                    rating: strongest.rating,
                    confidence: strongest.confidence,
                    matches: strongest.matches as f64,
                }
            }
        }
    }
}

impl Default for EntityClass {
    fn default() -> Self {
        Self::player()
    }
}

fn reject_repeats(match_id: &MatchId, members: &[&str]) -> crate::error::Result<()> {
    if members.len() == 2 && members[0] == members[1] {
        return Err(invalid_side(
            match_id,
            format!("Entity {} appears twice on one side", members[0]),
        ));
    }
    Ok(())
}

fn invalid_side(match_id: &MatchId, reason: impl Into<String>) -> anyhow::Error {
    RatingError::InvalidSide {
        match_id: match_id.clone(),
        reason: reason.into(),
    }
    .into()
}
