//! Outcome resolution from raw match scores

use crate::types::Outcome;

/// Which side, if any, won a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub side_a_won: bool,
    pub side_b_won: bool,
}

impl MatchResult {
    /// Both flags false
    pub fn is_draw(&self) -> bool {
        !self.side_a_won && !self.side_b_won
    }

    /// Outcome from side A's point of view
    pub fn side_a_outcome(&self) -> Outcome {
        if self.side_a_won {
            Outcome::Win
        } else if self.side_b_won {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }

    /// Outcome from side B's point of view
    pub fn side_b_outcome(&self) -> Outcome {
        self.side_a_outcome().reversed()
    }
}

/// Classify a match from its two scores. Scores are assumed to be validated upstream.
pub fn resolve(score_a: u32, score_b: u32) -> MatchResult {
    MatchResult {
        side_a_won: score_a > score_b,
        side_b_won: score_b > score_a,
    }
}
