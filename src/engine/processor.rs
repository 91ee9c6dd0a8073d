//! Per-match rating pipeline
//!
//! The engine holds only configuration. All mutable data lives in a caller-owned
//! [`RatingState`] scoped to one run, and every match is applied completely
//! (resolve sides, create entities, snapshot population and ranks, rate, store,
//! append history) before the next one starts.

use crate::config::RatingConfig;
use crate::engine::history::MatchHistory;
use crate::engine::sequencer;
use crate::entity::{EntityClass, IdentityRule};
use crate::error::{RatingError, Result};
use crate::rating::model::{AdaptiveEloModel, RatingInput, RatingModel};
use crate::rating::outcome::resolve;
use crate::rating::storage::EntityStore;
use crate::types::{
    EntityId, EntityState, MatchHistoryEntry, MatchRecord, Outcome, ParticipantRecord, RunOutput,
    SeedMap, SideLabel,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Mutable state of one processing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingState {
    store: EntityStore,
    history: MatchHistory,
}

impl RatingState {
    /// Empty state; entities start from the model's initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty state whose entities start from `seeds` on first appearance
    pub fn with_seeds(seeds: SeedMap) -> Self {
        Self {
            store: EntityStore::with_seeds(seeds),
            history: MatchHistory::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn history(&self) -> &MatchHistory {
        &self.history
    }

    /// Current state of one entity
    pub fn entity(&self, entity_id: &str) -> Option<&EntityState> {
        self.store.get(entity_id)
    }

    /// Entities ordered by rating, then wins, then identifier
    pub fn leaderboard(&self) -> Vec<(&EntityId, &EntityState)> {
        self.store.leaderboard()
    }

    /// Final entity states and the audit trail
    pub fn into_output(self) -> RunOutput {
        RunOutput {
            entities: self.store.into_entities(),
            history: self.history.into_entries(),
        }
    }
}

/// What happened to a match handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDisposition {
    Rated,
    /// Both sides resolve to the same entity, e.g. a ZZ vs ZZ race mirror
    Mirror,
}

/// Rating engine for one entity class
#[derive(Debug, Clone)]
pub struct RatingEngine<M = AdaptiveEloModel> {
    model: M,
    class: EntityClass,
}

impl RatingEngine<AdaptiveEloModel> {
    /// Engine using the adaptive Elo model
    pub fn new(class: EntityClass, config: RatingConfig) -> Result<Self> {
        Ok(Self::with_model(class, AdaptiveEloModel::new(config)?))
    }
}

impl<M: RatingModel> RatingEngine<M> {
    pub fn with_model(class: EntityClass, model: M) -> Self {
        Self { model, class }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn class(&self) -> &EntityClass {
        &self.class
    }

    /// Apply one match to `state`.
    ///
    /// Structurally invalid sides fail before anything in `state` changes.
    pub fn process_match(
        &self,
        state: &mut RatingState,
        record: &MatchRecord,
    ) -> Result<MatchDisposition> {
        let side_a = self
            .class
            .participants(&record.match_id, record.side(SideLabel::A))?;
        let side_b = self
            .class
            .participants(&record.match_id, record.side(SideLabel::B))?;

        if let Some(shared) = side_a.iter().find(|id| side_b.contains(id)) {
            if self.class.identity == IdentityRule::RaceComposition {
                debug!(match_id = %record.match_id, entity = %shared, "Skipping mirror match");
                return Ok(MatchDisposition::Mirror);
            }
            return Err(RatingError::InvalidSide {
                match_id: record.match_id.clone(),
                reason: format!("Entity {} appears on both sides", shared),
            }
            .into());
        }

        let result = resolve(record.score_a, record.score_b);

        let initial = self.model.initial_state();
        for id in side_a.iter().chain(side_b.iter()) {
            if state.store.ensure(id, &initial) {
                debug!(entity = %id, "Created entity");
            }
        }

        // Snapshot after creation so the probability model sees new entities
        let population = state.store.population(self.model.min_std_dev());
        let ranks = state.store.ranks();

        let before_a = snapshot(&state.store, &side_a)?;
        let before_b = snapshot(&state.store, &side_b)?;
        let opponent_of_a = self.class.aggregate(&before_b.iter().collect::<Vec<_>>());
        let opponent_of_b = self.class.aggregate(&before_a.iter().collect::<Vec<_>>());

        let sides = [
            (SideLabel::A, &side_a, &before_a, opponent_of_a, result.side_a_outcome()),
            (SideLabel::B, &side_b, &before_b, opponent_of_b, result.side_b_outcome()),
        ];

        let mut participants = Vec::with_capacity(side_a.len() + side_b.len());
        let mut updates = Vec::with_capacity(side_a.len() + side_b.len());
        for (label, ids, before, opponent, outcome) in sides {
            for (id, own) in ids.iter().zip(before.iter()) {
                let update = self.model.rate(&RatingInput {
                    own,
                    opponent,
                    population,
                    outcome,
                });

                participants.push(ParticipantRecord {
                    entity_id: id.clone(),
                    side: label,
                    outcome,
                    rating_before: own.rating,
                    rank_before: ranks.get(id).copied().unwrap_or(ranks.len() + 1),
                    confidence_before: own.confidence,
                    rating_after: update.state.rating,
                    confidence_after: update.state.confidence,
                    delta: update.details.delta,
                    win_probability: update.details.win_probability,
                    base_k: update.details.base_k,
                    k_factor: update.details.k_factor,
                });
                updates.push((id, update.state));
            }
        }

        for (id, new_state) in updates {
            state.store.store(id, new_state);
        }

        debug!(
            match_id = %record.match_id,
            outcome = %result.side_a_outcome(),
            deltas = ?participants.iter().map(|p| (p.entity_id.as_str(), p.delta)).collect::<Vec<_>>(),
            "Processed match"
        );

        let sequence = state.history.next_sequence();
        state.history.record(MatchHistoryEntry {
            sequence,
            match_id: record.match_id.clone(),
            tournament_date: record.tournament_date,
            round: sequencer::effective_round(record).to_string(),
            participants,
        });

        Ok(MatchDisposition::Rated)
    }

    /// Apply already-ordered matches; returns how many were rated
    pub fn process_ordered<'a, I>(&self, state: &mut RatingState, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut rated = 0;
        for record in records {
            if self.process_match(state, record)? == MatchDisposition::Rated {
                rated += 1;
            }
        }
        Ok(rated)
    }

    /// Sequence `records` canonically and process them from `seeds`
    pub fn run(&self, records: &[MatchRecord], seeds: SeedMap) -> Result<RunOutput> {
        let mut state = RatingState::with_seeds(seeds);
        let rated = self.process_ordered(&mut state, sequencer::sequence_refs(records))?;

        info!(
            class = %self.class.kind,
            matches = records.len(),
            rated,
            entities = state.store.len(),
            "Rating run complete"
        );

        Ok(state.into_output())
    }
}

fn snapshot(store: &EntityStore, ids: &[EntityId]) -> Result<Vec<EntityState>> {
    ids.iter()
        .map(|id| {
            store.get(id).cloned().ok_or_else(|| {
                anyhow::Error::from(RatingError::InternalError {
                    message: format!("Entity {} missing after creation", id),
                })
            })
        })
        .collect()
}

/// Final ratings of a run keyed by entity, as used for seeding
pub fn final_ratings(output: &RunOutput) -> BTreeMap<EntityId, f64> {
    output
        .entities
        .iter()
        .map(|(id, state)| (id.clone(), state.rating))
        .collect()
}

/// Convenience for the outcome of a participant in a history entry
pub fn outcome_of(entry: &MatchHistoryEntry, entity_id: &str) -> Option<Outcome> {
    entry
        .participants
        .iter()
        .find(|p| p.entity_id == entity_id)
        .map(|p| p.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityClass;
    use crate::rating::model::{CalculationDetails, RatingUpdate};
    use crate::types::Seed;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn ids(members: &[&str]) -> Vec<EntityId> {
        members.iter().map(|m| m.to_string()).collect()
    }

    fn engine(class: EntityClass) -> RatingEngine {
        RatingEngine::new(class, RatingConfig::default()).unwrap()
    }

    /// Mock model that records its inputs and returns a fixed delta
    #[derive(Debug, Default)]
    struct MockRatingModel {
        calls: Mutex<Vec<(EntityState, f64, usize, Outcome)>>,
    }

    impl MockRatingModel {
        fn get_calls(&self) -> Vec<(EntityState, f64, usize, Outcome)> {
            self.calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default()
        }
    }

    impl RatingModel for MockRatingModel {
        fn rate(&self, input: &RatingInput<'_>) -> RatingUpdate {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((
                    input.own.clone(),
                    input.opponent.rating,
                    input.population.count,
                    input.outcome,
                ));
            }
            let delta = match input.outcome {
                Outcome::Win => 10.0,
                Outcome::Loss => -10.0,
                Outcome::Draw => 0.0,
            };
            let mut state = input.own.clone();
            state.rating += delta;
            state.matches += 1;
            RatingUpdate {
                state,
                details: CalculationDetails {
                    base_k: 1.0,
                    k_factor: 1.0,
                    win_probability: 0.5,
                    delta,
                    prediction_correct: false,
                },
            }
        }

        fn initial_state(&self) -> EntityState {
            EntityState::new(1000.0, 0.0)
        }

        fn min_std_dev(&self) -> f64 {
            1.0
        }

        fn config(&self) -> serde_json::Value {
            serde_json::json!({ "type": "mock" })
        }
    }

    #[test]
    fn test_first_match_between_new_players() {
        let engine = engine(EntityClass::player());
        let mut state = RatingState::new();
        let record = MatchRecord::new("m1", day(1), ids(&["X"]), ids(&["Y"]), 0, 2);

        let disposition = engine.process_match(&mut state, &record).unwrap();
        assert_eq!(disposition, MatchDisposition::Rated);

        let x = state.entity("X").unwrap();
        let y = state.entity("Y").unwrap();
        assert_eq!(x.rating, -60.0);
        assert_eq!(y.rating, 60.0);
        assert_eq!(x.losses, 1);
        assert_eq!(y.wins, 1);

        let entry = state.history().last().unwrap();
        assert_eq!(entry.sequence, 0);
        assert_eq!(entry.participants.len(), 2);
        let x_record = &entry.participants[0];
        assert_eq!(x_record.entity_id, "X");
        assert_eq!(x_record.win_probability, 0.5);
        assert_eq!(x_record.k_factor, 120.0);
        assert_eq!(x_record.delta, -60.0);
        assert_eq!(x_record.rating_before, 0.0);
        assert_eq!(outcome_of(entry, "Y"), Some(Outcome::Win));
    }

    #[test]
    fn test_two_player_sides_use_opponent_mean() {
        let model = MockRatingModel::default();
        let engine = RatingEngine::with_model(EntityClass::player(), model);

        let mut seeds = SeedMap::new();
        seeds.insert("c".to_string(), Seed::rating_only(1200.0));
        seeds.insert("d".to_string(), Seed::rating_only(1400.0));
        let mut state = RatingState::with_seeds(seeds);

        let record = MatchRecord::new("m1", day(1), ids(&["a", "b"]), ids(&["c", "d"]), 2, 1);
        engine.process_match(&mut state, &record).unwrap();

        let calls = engine.model().get_calls();
        assert_eq!(calls.len(), 4);
        // Side A faces mean(1200, 1400); side B faces mean(1000, 1000)
        assert_eq!(calls[0].1, 1300.0);
        assert_eq!(calls[1].1, 1300.0);
        assert_eq!(calls[2].1, 1000.0);
        assert_eq!(calls[3].3, Outcome::Loss);
        // Population snapshot includes the entities created for this match
        assert!(calls.iter().all(|call| call.2 == 4));

        assert_eq!(state.entity("a").unwrap().rating, 1010.0);
        assert_eq!(state.entity("d").unwrap().rating, 1390.0);
    }

    #[test]
    fn test_updates_use_pre_match_states() {
        let model = MockRatingModel::default();
        let engine = RatingEngine::with_model(EntityClass::player(), model);
        let mut state = RatingState::new();

        engine
            .process_match(
                &mut state,
                &MatchRecord::new("m1", day(1), ids(&["a", "b"]), ids(&["c"]), 1, 0),
            )
            .unwrap();

        // c saw the mean of a and b before either moved
        let calls = engine.model().get_calls();
        assert_eq!(calls[2].0.rating, 1000.0);
        assert_eq!(calls[2].1, 1000.0);
    }

    #[test]
    fn test_team_class_rates_one_entity_per_side() {
        let engine = engine(EntityClass::team());
        let mut state = RatingState::new();
        let record = MatchRecord::new(
            "R1M1",
            day(2),
            ids(&["UThermal", "Serral"]),
            ids(&["Maru", "Reynor"]),
            2,
            0,
        );

        engine.process_match(&mut state, &record).unwrap();

        assert_eq!(state.store().len(), 2);
        assert_eq!(state.entity("Serral+UThermal").unwrap().rating, 60.0);
        assert_eq!(state.entity("Maru+Reynor").unwrap().rating, -60.0);
        assert_eq!(state.history().last().unwrap().round, "Playoffs");
    }

    #[test]
    fn test_draw_is_recorded() {
        let engine = engine(EntityClass::player());
        let mut state = RatingState::new();
        engine
            .process_match(
                &mut state,
                &MatchRecord::new("m1", day(1), ids(&["a"]), ids(&["b"]), 1, 1),
            )
            .unwrap();

        let a = state.entity("a").unwrap();
        assert_eq!(a.rating, 0.0);
        assert_eq!(a.matches, 1);
        assert_eq!(a.draws(), 1);
        let entry = state.history().last().unwrap();
        assert!(entry
            .participants
            .iter()
            .all(|p| p.outcome == Outcome::Draw));
    }

    #[test]
    fn test_invalid_side_leaves_state_untouched() {
        let engine = engine(EntityClass::player());
        let mut state = RatingState::new();
        engine
            .process_match(
                &mut state,
                &MatchRecord::new("m1", day(1), ids(&["a"]), ids(&["b"]), 1, 0),
            )
            .unwrap();
        let before = state.clone();

        let empty = MatchRecord::new("m2", day(2), ids(&["c"]), vec![], 1, 0);
        let err = engine.process_match(&mut state, &empty).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::InvalidSide { .. })
        ));

        let both_sides = MatchRecord::new("m3", day(2), ids(&["a", "c"]), ids(&["a"]), 1, 0);
        assert!(engine.process_match(&mut state, &both_sides).is_err());

        assert_eq!(state, before);
    }

    #[test]
    fn test_race_mirror_is_skipped() {
        let engine = engine(EntityClass::race());
        let mut state = RatingState::new();
        let mirror = MatchRecord::new("m1", day(1), ids(&["Z", "Zerg"]), ids(&["z", "Z"]), 2, 0);

        let disposition = engine.process_match(&mut state, &mirror).unwrap();
        assert_eq!(disposition, MatchDisposition::Mirror);
        assert!(state.store().is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_rank_before_reflects_prior_results() {
        let engine = engine(EntityClass::player());
        let mut state = RatingState::new();
        engine
            .process_match(
                &mut state,
                &MatchRecord::new("m1", day(1), ids(&["a"]), ids(&["b"]), 1, 0),
            )
            .unwrap();
        engine
            .process_match(
                &mut state,
                &MatchRecord::new("m2", day(2), ids(&["b"]), ids(&["c"]), 1, 0),
            )
            .unwrap();

        let entry = state.history().last().unwrap();
        // a is ahead; c is new at 0 and ahead of b (-60) on rating
        assert_eq!(entry.participants[0].entity_id, "b");
        assert_eq!(entry.participants[0].rank_before, 3);
        assert_eq!(entry.participants[1].rank_before, 2);
    }

    #[test]
    fn test_run_sequences_input() {
        let engine = engine(EntityClass::player());
        let records = vec![
            MatchRecord::new("m2", day(2), ids(&["a"]), ids(&["b"]), 0, 1),
            MatchRecord::new("m1", day(1), ids(&["a"]), ids(&["b"]), 1, 0),
        ];

        let output = engine.run(&records, SeedMap::new()).unwrap();
        let order: Vec<&str> = output
            .history
            .iter()
            .map(|entry| entry.match_id.as_str())
            .collect();
        assert_eq!(order, vec!["m1", "m2"]);
        assert_eq!(output.entities["a"].matches, 2);
        assert_eq!(final_ratings(&output).len(), 2);
    }
}
