//! Three-pass seeding bootstrap for cold-start seasons
//!
//! A single forward pass from zero is sensitive to match order when most entities
//! have played only a handful of matches. The bootstrap runs the rating pipeline
//! over the season-one subset three times:
//!
//! 1. forward from zero, keeping final ratings,
//! 2. backward from zero, keeping final ratings,
//! 3. forward again, each entity starting from the mean of its pass 1 and pass 2 rating.
//!
//! Only pass 3's final ratings and confidences are returned. Passes 1 and 2 share
//! no state and may run in parallel on the rayon pool.

use crate::engine::processor::{RatingEngine, RatingState};
use crate::engine::sequencer;
use crate::error::Result;
use crate::rating::model::RatingModel;
use crate::types::{EntityId, MatchRecord, RunOutput, Seed, SeedMap};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::info;

/// Final ratings of a bootstrap pass
pub type PassRatings = BTreeMap<EntityId, f64>;

/// Seeds and results of a season: bootstrap over season one, then the rest
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRun {
    pub seeds: SeedMap,
    pub output: RunOutput,
}

/// Replay `records` in the given order from an empty state, returning final ratings
fn replay<'a, M, I>(engine: &RatingEngine<M>, records: I) -> Result<PassRatings>
where
    M: RatingModel,
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut state = RatingState::new();
    engine.process_ordered(&mut state, records)?;
    Ok(state
        .store()
        .iter()
        .map(|(id, entity)| (id.clone(), entity.rating))
        .collect())
}

/// Starting ratings for pass 3: the mean of both earlier passes
pub fn averaged_seeds(forward: &PassRatings, backward: &PassRatings) -> SeedMap {
    let mut seeds = SeedMap::new();
    for (id, rating) in forward {
        let combined = match backward.get(id) {
            Some(other) => (rating + other) / 2.0,
            None => *rating,
        };
        seeds.insert(id.clone(), Seed::rating_only(combined));
    }
    for (id, rating) in backward {
        seeds
            .entry(id.clone())
            .or_insert_with(|| Seed::rating_only(*rating));
    }
    seeds
}

/// Run passes 1 and 2 over already-sequenced records
fn directional_passes<M: RatingModel>(
    engine: &RatingEngine<M>,
    ordered: &[&MatchRecord],
    parallel: bool,
) -> Result<(PassRatings, PassRatings)> {
    if !parallel {
        let forward = replay(engine, ordered.iter().copied())?;
        let backward = replay(engine, ordered.iter().rev().copied())?;
        return Ok((forward, backward));
    }

    let (forward, backward) = rayon::join(
        || replay(engine, ordered.iter().copied()),
        || replay(engine, ordered.iter().rev().copied()),
    );
    Ok((forward?, backward?))
}

/// Produce cold-start seeds from a season-one subset.
///
/// An empty subset yields an empty seed map. Nothing outside the returned map
/// is modified.
pub fn bootstrap<M: RatingModel>(
    engine: &RatingEngine<M>,
    season: &[MatchRecord],
    parallel: bool,
) -> Result<SeedMap> {
    if season.is_empty() {
        info!("Empty bootstrap subset, no seeds produced");
        return Ok(SeedMap::new());
    }

    let ordered = sequencer::sequence_refs(season);
    let (forward, backward) = directional_passes(engine, &ordered, parallel)?;
    let starting = averaged_seeds(&forward, &backward);

    let mut state = RatingState::with_seeds(starting);
    engine.process_ordered(&mut state, ordered.iter().copied())?;

    let seeds: SeedMap = state
        .store()
        .iter()
        .map(|(id, entity)| {
            (
                id.clone(),
                Seed {
                    rating: entity.rating,
                    confidence: entity.confidence,
                },
            )
        })
        .collect();

    info!(
        class = %engine.class().kind,
        matches = season.len(),
        entities = seeds.len(),
        "Seeding bootstrap complete"
    );

    Ok(seeds)
}

/// Split records into season one (tournament date on or before `season_end`) and the rest
pub fn split_season(
    records: Vec<MatchRecord>,
    season_end: NaiveDate,
) -> (Vec<MatchRecord>, Vec<MatchRecord>) {
    records
        .into_iter()
        .partition(|record| record.tournament_date <= season_end)
}

/// Bootstrap season one, then rate the remaining matches from the bootstrapped seeds
pub fn run_season<M: RatingModel>(
    engine: &RatingEngine<M>,
    season_one: &[MatchRecord],
    rest: &[MatchRecord],
    parallel: bool,
) -> Result<SeasonRun> {
    let seeds = bootstrap(engine, season_one, parallel)?;
    let output = engine.run(rest, seeds.clone())?;
    Ok(SeasonRun { seeds, output })
}
