//! Canonical match ordering
//!
//! Rating deltas are path-dependent, so every run replays matches in one total
//! order regardless of how the records arrived:
//!
//! 1. tournament date,
//! 2. round precedence (qualifiers, groups, bracket rounds, finals),
//! 3. match date, where a missing match date counts as the start of the tournament day,
//! 4. match id, then side and score contents for exact duplicates.
//!
//! Round precedence comes before the match date because scraped brackets often
//! carry no match dates while their group stages do.

use crate::types::MatchRecord;
use chrono::{NaiveDateTime, NaiveTime};
use std::cmp::Ordering;

/// Round label used for bracket matches whose label is missing
pub const PLAYOFFS_ROUND: &str = "Playoffs";
/// Round label used for group matches whose label is missing
pub const GROUP_STAGE_ROUND: &str = "Group Stage";

/// Precedence of a round label; lower values are played earlier.
///
/// | rank | rounds |
/// |------|--------|
/// | 0 | qualifiers |
/// | 1 | group stage, swiss, round robin |
/// | 2 | generic bracket/playoffs, unknown labels |
/// | 3 | round of 16 |
/// | 4 | quarterfinals |
/// | 5 | semifinals |
/// | 6 | third place match |
/// | 7 | finals other than the grand final |
/// | 8 | grand final |
pub fn round_rank(label: &str) -> u8 {
    let label = label.trim().to_lowercase();

    if label.contains("qualif") {
        0
    } else if label.contains("group") || label.contains("swiss") || label.contains("round robin")
    {
        1
    } else if label.contains("third") || label.contains("3rd") || label.contains("bronze") {
        6
    } else if label.contains("semi") || label.contains("round of 4") || label == "ro4" {
        5
    } else if label.contains("quarter") || label.contains("round of 8") || label == "ro8" {
        4
    } else if label.contains("round of 16") || label == "ro16" {
        3
    } else if label.contains("grand final") {
        8
    } else if label.contains("final") {
        7
    } else {
        2
    }
}

/// Round label implied by a bracket match id when no label was supplied
pub fn infer_round(match_id: &str) -> Option<&'static str> {
    match match_id.trim().chars().next() {
        Some('R') => Some(PLAYOFFS_ROUND),
        Some('M') => Some(GROUP_STAGE_ROUND),
        _ => None,
    }
}

/// Round label of a record, falling back to the label implied by its match id
pub fn effective_round(record: &MatchRecord) -> &str {
    if record.round.trim().is_empty() {
        infer_round(&record.match_id).unwrap_or("")
    } else {
        &record.round
    }
}

fn effective_match_date(record: &MatchRecord) -> NaiveDateTime {
    record
        .match_date
        .unwrap_or_else(|| record.tournament_date.and_time(NaiveTime::MIN))
}

/// Total order over match records
pub fn compare(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.tournament_date
        .cmp(&b.tournament_date)
        .then_with(|| round_rank(effective_round(a)).cmp(&round_rank(effective_round(b))))
        .then_with(|| effective_match_date(a).cmp(&effective_match_date(b)))
        .then_with(|| a.match_id.cmp(&b.match_id))
        .then_with(|| a.side_a.cmp(&b.side_a))
        .then_with(|| a.side_b.cmp(&b.side_b))
        .then_with(|| a.score_a.cmp(&b.score_a))
        .then_with(|| a.score_b.cmp(&b.score_b))
}

/// Put records into canonical replay order
pub fn sequence(mut records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    records.sort_by(compare);
    records
}

/// Canonical order of borrowed records
pub fn sequence_refs(records: &[MatchRecord]) -> Vec<&MatchRecord> {
    let mut refs: Vec<&MatchRecord> = records.iter().collect();
    refs.sort_by(|a, b| compare(a, b));
    refs
}
