//! Performance benchmarks for rating runs and the seeding bootstrap

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use duo_ladder::config::RatingConfig;
use duo_ladder::engine::{bootstrap, RatingEngine};
use duo_ladder::entity::EntityClass;
use duo_ladder::rating::{
    AdaptiveEloModel, OpponentSnapshot, PopulationSnapshot, RatingInput, RatingModel,
};
use duo_ladder::types::{EntityState, MatchRecord, Outcome, SeedMap};

/// Synthetic 2v2 season: 200 matches among 24 players over 25 tournaments
fn bench_season() -> Vec<MatchRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    (0..200usize)
        .map(|i| {
            let player = |offset: usize| format!("player_{:02}", (i * 5 + offset) % 24);
            MatchRecord::new(
                format!("M{}", i),
                start + chrono::Days::new((i / 8) as u64 * 7),
                vec![player(0), player(1)],
                vec![player(2), player(3)],
                (i % 3) as u32,
                ((i * 7 + 1) % 3) as u32,
            )
        })
        .collect()
}

fn bench_rating_model(c: &mut Criterion) {
    let model = AdaptiveEloModel::new(RatingConfig::default()).unwrap();
    let own = EntityState {
        rating: 35.0,
        confidence: 60.0,
        matches: 25,
        wins: 14,
        losses: 11,
    };
    let population =
        PopulationSnapshot::from_ratings((0..24).map(|i| i as f64 * 15.0 - 180.0), 100.0);
    let opponent = OpponentSnapshot {
        rating: -20.0,
        confidence: 40.0,
        matches: 12.0,
    };

    c.bench_function("adaptive_elo_rate", |b| {
        b.iter(|| {
            black_box(model.rate(&RatingInput {
                own: black_box(&own),
                opponent,
                population,
                outcome: Outcome::Win,
            }))
        })
    });
}

fn bench_full_run(c: &mut Criterion) {
    let season = bench_season();
    let mut group = c.benchmark_group("full_run");

    for class in [EntityClass::player(), EntityClass::team()] {
        let engine = RatingEngine::new(class.clone(), RatingConfig::default()).unwrap();
        group.bench_function(class.kind.to_string(), |b| {
            b.iter(|| black_box(engine.run(black_box(&season), SeedMap::new()).unwrap()))
        });
    }

    group.finish();
}

fn bench_bootstrap(c: &mut Criterion) {
    let season = bench_season();
    let engine = RatingEngine::new(EntityClass::player(), RatingConfig::default()).unwrap();
    let mut group = c.benchmark_group("bootstrap");

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(bootstrap(&engine, black_box(&season), false).unwrap()))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(bootstrap(&engine, black_box(&season), true).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_rating_model, bench_full_run, bench_bootstrap);
criterion_main!(benches);
