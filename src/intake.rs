//! Intake of untrusted match records
//!
//! Raw records come from scraped tournament data. A record with a missing or
//! non-numeric score, an unparseable date or a blank match id is rejected here
//! and never reaches the engine; nothing is coerced into a default.

use crate::engine::sequencer::infer_round;
use crate::error::{RatingError, Result};
use crate::types::{EntityId, MatchRecord};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Status of a match that is eligible for rating
pub const COMPLETED_STATUS: &str = "completed";

const MATCH_DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Match record as received from the collector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMatchRecord {
    pub match_id: Option<String>,
    pub tournament_date: Option<String>,
    pub match_date: Option<String>,
    pub round: Option<String>,
    pub side_a: Vec<EntityId>,
    pub side_b: Vec<EntityId>,
    pub score_a: Option<serde_json::Value>,
    pub score_b: Option<serde_json::Value>,
    /// `scheduled`, `in_progress`, `completed` or `cancelled`
    pub status: Option<String>,
}

/// A raw record that did not make it into the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub match_id: String,
    pub reason: String,
}

/// Outcome of validating a batch of raw records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeReport {
    pub accepted: Vec<MatchRecord>,
    pub rejected: Vec<Rejection>,
    /// Match ids skipped because they are not completed
    pub skipped: Vec<String>,
}

impl RawMatchRecord {
    fn id_for_errors(&self) -> String {
        self.match_id
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    /// Whether this record's status allows rating
    pub fn is_completed(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case(COMPLETED_STATUS))
            .unwrap_or(true)
    }
}

/// Validate one raw record. Returns `Ok(None)` for matches that are not completed.
pub fn validate(raw: &RawMatchRecord) -> Result<Option<MatchRecord>> {
    let id = raw.id_for_errors();

    let match_id = raw
        .match_id
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| malformed(&id, "Missing match id"))?
        .to_string();

    if !raw.is_completed() {
        return Ok(None);
    }

    let tournament_date = raw
        .tournament_date
        .as_deref()
        .ok_or_else(|| malformed(&id, "Missing tournament date"))
        .and_then(|date| {
            NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .map_err(|_| malformed(&id, format!("Invalid tournament date: {}", date)))
        })?;

    let match_date = match raw.match_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(date) => Some(
            parse_match_date(date)
                .ok_or_else(|| malformed(&id, format!("Invalid match date: {}", date)))?,
        ),
    };

    let score_a = parse_score(&id, "score_a", raw.score_a.as_ref())?;
    let score_b = parse_score(&id, "score_b", raw.score_b.as_ref())?;

    let round = match raw.round.as_deref().map(str::trim) {
        Some(round) if !round.is_empty() => round.to_string(),
        _ => infer_round(&match_id).unwrap_or_default().to_string(),
    };

    Ok(Some(MatchRecord {
        match_id,
        tournament_date,
        match_date,
        round,
        side_a: raw.side_a.clone(),
        side_b: raw.side_b.clone(),
        score_a,
        score_b,
    }))
}

/// Validate a batch, dropping malformed, duplicate and non-completed records
pub fn validate_all(raws: &[RawMatchRecord]) -> IntakeReport {
    let mut report = IntakeReport::default();
    let mut seen = HashSet::new();

    for raw in raws {
        match validate(raw) {
            Ok(Some(record)) => {
                if seen.insert(record.match_id.clone()) {
                    report.accepted.push(record);
                } else {
                    warn!(match_id = %record.match_id, "Rejected duplicate match id");
                    report.rejected.push(Rejection {
                        match_id: record.match_id,
                        reason: "Duplicate match id".to_string(),
                    });
                }
            }
            Ok(None) => {
                let match_id = raw.id_for_errors();
                warn!(
                    match_id = %match_id,
                    status = raw.status.as_deref().unwrap_or_default(),
                    "Skipped match that is not completed"
                );
                report.skipped.push(match_id);
            }
            Err(e) => {
                warn!(error = %e, "Rejected malformed match");
                report.rejected.push(Rejection {
                    match_id: raw.id_for_errors(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

fn parse_match_date(date: &str) -> Option<NaiveDateTime> {
    MATCH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn parse_score(id: &str, field: &str, value: Option<&serde_json::Value>) -> Result<u32> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| malformed(id, format!("Missing {}", field)))?;

    let parsed = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| malformed(id, format!("Non-numeric {}: {}", field, value)))
}

fn malformed(id: &str, reason: impl Into<String>) -> anyhow::Error {
    RatingError::MalformedMatch {
        match_id: id.to_string(),
        reason: reason.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawMatchRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_record() {
        let record = validate(&raw(json!({
            "match_id": "R1M1",
            "tournament_date": "2024-01-15",
            "match_date": "2024-01-15 18:30:00",
            "side_a": ["UThermal", "Serral"],
            "side_b": ["Maru", "Reynor"],
            "score_a": 2,
            "score_b": "1"
        })))
        .unwrap()
        .unwrap();

        assert_eq!(record.match_id, "R1M1");
        assert_eq!(record.score_a, 2);
        assert_eq!(record.score_b, 1);
        assert_eq!(record.round, "Playoffs");
        assert_eq!(
            record.match_date,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(18, 30, 0)
        );
    }

    #[test]
    fn test_missing_score_is_rejected() {
        let err = validate(&raw(json!({
            "match_id": "M1",
            "tournament_date": "2024-01-15",
            "side_a": ["a"],
            "side_b": ["b"],
            "score_a": 2
        })))
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::MalformedMatch { .. })
        ));
    }

    #[test]
    fn test_non_numeric_scores_are_rejected() {
        for bad in [json!("W"), json!(-1), json!(1.5), json!(null), json!([2])] {
            let result = validate(&raw(json!({
                "match_id": "M1",
                "tournament_date": "2024-01-15",
                "side_a": ["a"],
                "side_b": ["b"],
                "score_a": bad,
                "score_b": 0
            })));
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        let bad_tournament = validate(&raw(json!({
            "match_id": "M1",
            "tournament_date": "January 15",
            "score_a": 1,
            "score_b": 0
        })));
        assert!(bad_tournament.is_err());

        let bad_match_date = validate(&raw(json!({
            "match_id": "M1",
            "tournament_date": "2024-01-15",
            "match_date": "{{abbr/CET}}",
            "score_a": 1,
            "score_b": 0
        })));
        assert!(bad_match_date.is_err());
    }

    #[test]
    fn test_non_completed_match_is_skipped() {
        let result = validate(&raw(json!({
            "match_id": "M1",
            "tournament_date": "2024-01-15",
            "status": "scheduled"
        })))
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_batch_report() {
        let raws = vec![
            raw(json!({"match_id": "M1", "tournament_date": "2024-01-15",
                       "side_a": ["a"], "side_b": ["b"], "score_a": 1, "score_b": 0,
                       "status": "Completed"})),
            raw(json!({"match_id": "M1", "tournament_date": "2024-01-15",
                       "side_a": ["a"], "side_b": ["b"], "score_a": 0, "score_b": 1})),
            raw(json!({"match_id": "M2", "tournament_date": "2024-01-15",
                       "side_a": ["a"], "side_b": ["b"], "score_a": "x", "score_b": 1})),
            raw(json!({"match_id": "M3", "tournament_date": "2024-01-16",
                       "status": "cancelled"})),
            raw(json!({"tournament_date": "2024-01-16", "score_a": 1, "score_b": 0})),
        ];

        let report = validate_all(&raws);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].round, "Group Stage");
        assert_eq!(report.rejected.len(), 3);
        assert_eq!(report.rejected[0].reason, "Duplicate match id");
        assert_eq!(report.rejected[2].match_id, "<unknown>");
        assert_eq!(report.skipped, vec!["M3".to_string()]);
    }
}
