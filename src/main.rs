//! Command line entry point for the duo-ladder rating engine
//!
//! Reads scraped match records as JSON, validates them, optionally bootstraps a
//! cold-start season, runs the rating engine and writes entity states plus the
//! match history as JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use duo_ladder::config::AppConfig;
use duo_ladder::engine::{run_season, split_season, RatingEngine};
use duo_ladder::entity::{EntityClass, EntityClassKind};
use duo_ladder::intake::{self, RawMatchRecord, Rejection};
use duo_ladder::rating::RatingModel;
use duo_ladder::types::{EntityId, EntityState, MatchHistoryEntry, SeedMap};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Duo Ladder - skill ratings for small 2v2 tournament circuits
#[derive(Parser)]
#[command(
    name = "duo-ladder",
    version,
    about = "Rates players, teams and race matchups from a stream of match results",
    long_about = "Duo Ladder replays match results in a canonical order through an adaptive \
                 Elo model whose K-factor shrinks with experience and whose win probability \
                 scales with the spread of the current population. Cold-start seasons can be \
                 seeded with a forward/backward/forward bootstrap."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Match records to rate
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "JSON array of raw match records"
    )]
    matches: Option<PathBuf>,

    /// Starting seeds
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON object mapping entity id to {rating, confidence}"
    )]
    seeds: Option<PathBuf>,

    /// Entity class override
    #[arg(
        long,
        value_name = "CLASS",
        help = "Entity class to rate (player, team, race, team-race)"
    )]
    class: Option<EntityClassKind>,

    /// Season one cutoff override
    #[arg(
        long,
        value_name = "DATE",
        help = "Bootstrap matches up to this tournament date (YYYY-MM-DD)"
    )]
    season_end: Option<NaiveDate>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Output path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write results here instead of stdout"
    )]
    output: Option<PathBuf>,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without rating")]
    dry_run: bool,
}

/// Results written by a run
#[derive(Serialize)]
struct RunReport {
    class: EntityClassKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    season_seeds: Option<SeedMap>,
    entities: BTreeMap<EntityId, EntityState>,
    history: Vec<MatchHistoryEntry>,
    rejected: Vec<Rejection>,
    skipped: Vec<String>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if let Some(class) = args.class {
        config.run.entity_class = class;
    }
    if let Some(season_end) = args.season_end {
        config.run.season_end = Some(season_end);
    }

    duo_ladder::config::validate_config(&config)?;
    Ok(config)
}

fn read_matches(path: &Path) -> Result<Vec<RawMatchRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read matches from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse matches in {}", path.display()))
}

fn read_seeds(path: &Path) -> Result<SeedMap> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seeds from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse seeds in {}", path.display()))
}

fn write_report(report: &RunReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize results")?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display())),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

/// Display startup banner with run information
fn display_startup_banner(config: &AppConfig) {
    info!("Duo Ladder rating engine v{}", duo_ladder::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Entity class: {}", config.run.entity_class);
    match config.run.season_end {
        Some(date) => info!("   Season one ends: {}", date),
        None => info!("   Season one ends: (no bootstrap)"),
    }
    info!(
        "   Std dev floor: {}, scale per std dev: {}",
        config.rating.min_std_dev, config.rating.scale_per_std_dev
    );
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let class = EntityClass::from_kind(config.run.entity_class);
    let engine = RatingEngine::new(class, config.rating.clone())?;

    if args.dry_run {
        info!("Model configuration: {}", engine.model().config());
        info!("Dry run completed - exiting without rating");
        return Ok(());
    }

    let matches_path = args
        .matches
        .as_deref()
        .context("--matches is required unless --dry-run is set")?;
    let raws = read_matches(matches_path)?;
    let report = intake::validate_all(&raws);
    info!(
        received = raws.len(),
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        skipped = report.skipped.len(),
        "Validated match records"
    );

    let seeds = match &args.seeds {
        Some(path) => read_seeds(path)?,
        None => SeedMap::new(),
    };

    let (season_seeds, output) = match config.run.season_end {
        Some(season_end) => {
            if !seeds.is_empty() {
                warn!("Seed file ignored: season one is bootstrapped from its own matches");
            }
            let (season_one, rest) = split_season(report.accepted, season_end);
            let season = run_season(
                &engine,
                &season_one,
                &rest,
                config.run.parallel_seed_passes,
            )?;
            (Some(season.seeds), season.output)
        }
        None => (None, engine.run(&report.accepted, seeds)?),
    };

    write_report(
        &RunReport {
            class: config.run.entity_class,
            season_seeds,
            entities: output.entities,
            history: output.history,
            rejected: report.rejected,
            skipped: report.skipped,
        },
        args.output.as_deref(),
    )
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);
    run(&args, &config)
}
