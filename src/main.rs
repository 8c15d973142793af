//! Asteroid Pilot entry point
//!
//! Replays headless rounds with the autopilot and reports its win rate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use asteroid_pilot::sim::{AutopilotConfig, Game};
use asteroid_pilot::{RoundSummary, Settings, WinRateReport};

#[derive(Parser, Debug)]
#[command(name = "asteroid-pilot")]
#[command(about = "Estimate the asteroid autopilot's win rate over headless rounds")]
struct Cli {
    /// Number of rounds to play
    #[arg(long, default_value_t = 200)]
    games: usize,
    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,
    /// Settings JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Autopilot preset (overrides the settings file)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,
    #[arg(long)]
    width: Option<f32>,
    #[arg(long)]
    height: Option<f32>,
    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    Pursuit,
    #[value(name = "box")]
    BoxAvoidance,
    #[value(name = "circle")]
    CircleAvoidance,
}

impl From<Strategy> for AutopilotConfig {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Pursuit => AutopilotConfig::pursuit(),
            Strategy::BoxAvoidance => AutopilotConfig::box_avoidance(),
            Strategy::CircleAvoidance => AutopilotConfig::circle_avoidance(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(strategy) = cli.strategy {
        settings.autopilot = strategy.into();
    }
    if let Some(width) = cli.width {
        settings.arena_width = width;
    }
    if let Some(height) = cli.height {
        settings.arena_height = height;
    }
    // Headless runs are always autopilot-driven and have nothing to draw on
    settings.human_controlled = false;
    settings.debug_mode = false;

    let mut game = Game::new(&settings, false).context("invalid settings")?;
    log::info!(
        "Playing {} rounds with {:?} (seed {})",
        cli.games,
        settings.autopilot,
        settings.seed
    );

    let rounds: Vec<RoundSummary> = (0..cli.games).map(|_| game.play_round()).collect();
    let report = WinRateReport::from_rounds(&rounds);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
