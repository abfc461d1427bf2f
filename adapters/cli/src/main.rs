#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Subjunctive games in the terminal.

mod config;
mod input;
mod session;

use std::{fs, io, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};
use subjunctive_system_floorpaint::Floorpaint;
use subjunctive_system_scheduler::MonotonicClock;
use subjunctive_system_think_green::Planet;
use subjunctive_world::DEFAULT_SPAWN_SEED;

use crate::config::{Config, GameKind};

/// Play a Subjunctive game with line-based keyboard input.
#[derive(Debug, Parser)]
#[command(name = "subjunctive", version, about)]
struct Args {
    /// Game to play; defaults to the config file's choice, then Think Green.
    #[arg(value_enum)]
    game: Option<GameKind>,

    /// Level file for Floorpaint.
    #[arg(long)]
    level: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for random spawning; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

/// Entry point for the Subjunctive command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if args.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let game = args.game.or(config.game).unwrap_or_default();
    let seed = args.seed.or(config.seed).unwrap_or(DEFAULT_SPAWN_SEED);
    let idle_tick = config.idle_tick()?;
    debug!("starting {game:?} with seed {seed} and idle tick {idle_tick:?}");

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let clock = MonotonicClock::new();
    let outcome = match game {
        GameKind::ThinkGreen => {
            let mut planet = Planet::new(seed).context("failed to start Think Green")?;
            session::run(&mut planet, stdin, stdout, &clock, idle_tick)?
        }
        GameKind::Floorpaint => {
            let Some(path) = args.level.or_else(|| config.level.map(PathBuf::from)) else {
                bail!("floorpaint needs a level file (--level or `level` in the config)");
            };
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read level at {}", path.display()))?;
            let mut floorpaint = Floorpaint::load(&text)
                .with_context(|| format!("failed to load level at {}", path.display()))?;
            session::run(&mut floorpaint, stdin, stdout, &clock, idle_tick)?
        }
    };
    debug!(
        "session ended after {} moves (finished: {})",
        outcome.moves, outcome.finished
    );
    Ok(())
}
