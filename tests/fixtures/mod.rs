//! Shared builders for integration and property tests

#![allow(dead_code)]

use chrono::NaiveDate;
use duo_ladder::config::RatingConfig;
use duo_ladder::engine::RatingEngine;
use duo_ladder::entity::EntityClass;
use duo_ladder::types::{EntityId, MatchRecord};

/// Tournament day in the test season
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|start| start.checked_add_days(chrono::Days::new(u64::from(d))))
        .unwrap_or_default()
}

pub fn ids(members: &[&str]) -> Vec<EntityId> {
    members.iter().map(|m| m.to_string()).collect()
}

/// 1v1 match between two players
pub fn duel(id: &str, d: u32, a: &str, b: &str, score_a: u32, score_b: u32) -> MatchRecord {
    MatchRecord::new(id, day(d), ids(&[a]), ids(&[b]), score_a, score_b)
}

/// 2v2 match between two pairs of players
pub fn doubles(
    id: &str,
    d: u32,
    side_a: [&str; 2],
    side_b: [&str; 2],
    score_a: u32,
    score_b: u32,
) -> MatchRecord {
    MatchRecord::new(id, day(d), ids(&side_a), ids(&side_b), score_a, score_b)
}

/// Engine with the default adaptive Elo configuration
pub fn default_engine(class: EntityClass) -> RatingEngine {
    RatingEngine::new(class, RatingConfig::default()).unwrap_or_else(|e| panic!("{}", e))
}

/// Deterministic synthetic season of 2v2 matches among `players` players
pub fn synthetic_season(matches: usize, players: usize) -> Vec<MatchRecord> {
    let players = players.max(4);
    (0..matches)
        .map(|i| {
            let p = |offset: usize| format!("player_{:03}", (i * 7 + offset) % players);
            let a1 = p(0);
            let a2 = p(1);
            let b1 = p(2);
            let b2 = p(3);
            let score_a = ((i * 5) % 3) as u32;
            let score_b = ((i * 11 + 1) % 3) as u32;
            MatchRecord::new(
                format!("M{}", i),
                day((i / 8) as u32),
                vec![a1, a2],
                vec![b1, b2],
                score_a,
                score_b,
            )
        })
        .collect()
}
