//! level-runner: play a SPACE KILLER level headlessly and print a summary.
//!
//! Usage:
//!   level-runner --level level2 --seconds 60
//!   level-runner --config run.json --autofire --json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spacekiller_core::commands::PlayerCommand;
use spacekiller_core::constants::{PLAYER_SIZE, SCREEN_WIDTH};
use spacekiller_core::enums::{Achievement, GamePhase, Level};
use spacekiller_core::events::GameEvent;
use spacekiller_core::types::Position;
use spacekiller_sim::{SimConfig, SimulationEngine};

#[derive(Parser)]
#[command(name = "level-runner")]
#[command(about = "Run a SPACE KILLER level script without a frontend")]
struct Cli {
    /// JSON simulation config; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level to play
    #[arg(long, value_enum)]
    level: Option<LevelArg>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 45.0)]
    seconds: f32,

    /// Fire every few frames, sweeping the ship left and right
    #[arg(long)]
    autofire: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    Level1,
    Level2,
    Level3,
}

impl From<LevelArg> for Level {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Level1 => Level::Level1,
            LevelArg::Level2 => Level::Level2,
            LevelArg::Level3 => Level::Level3,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    seed: u64,
    start_level: Level,
    end_level: Level,
    phase: GamePhase,
    ticks: u64,
    seconds: f64,
    score: u32,
    lives: u32,
    bombs: u32,
    squadron_bonuses: u32,
    lives_lost: u32,
    achievements: Vec<Achievement>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SimConfig::from_json(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(level) = cli.level {
        config.level = level.into();
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let summary = run(config, cli.seconds, cli.autofire)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{:?} -> {:?} after {:.1}s ({} ticks): {:?}, score {}, lives {}, bombs {}",
            summary.start_level,
            summary.end_level,
            summary.seconds,
            summary.ticks,
            summary.phase,
            summary.score,
            summary.lives,
            summary.bombs,
        );
        println!(
            "squadron bonuses: {}, lives lost: {}, achievements: {:?}",
            summary.squadron_bonuses, summary.lives_lost, summary.achievements
        );
    }
    Ok(())
}

fn run(config: SimConfig, seconds: f32, autofire: bool) -> Result<Summary> {
    let mut summary = Summary {
        seed: config.seed,
        start_level: config.level,
        ..Default::default()
    };
    let ticks = (seconds / config.frame_dt).ceil().max(0.0) as u64;

    let mut engine = SimulationEngine::new(config);
    engine.start();
    info!(ticks, "running level");

    let mut sweep = 2.0_f32;
    for tick in 0..ticks {
        if autofire {
            if tick % 8 == 0 {
                engine.queue_command(PlayerCommand::Fire);
            }
            let x = engine
                .world()
                .get::<&Position>(engine.player())
                .map(|p| p.x)
                .unwrap_or_default();
            if x <= 0.0 || x >= SCREEN_WIDTH - PLAYER_SIZE {
                sweep = -sweep;
            }
            engine.queue_command(PlayerCommand::Move { dx: sweep, dy: 0.0 });
        }

        let snapshot = engine
            .tick()
            .with_context(|| format!("Simulation failed at tick {tick}"))?;
        for event in &snapshot.events {
            match event {
                GameEvent::SquadronBonus { .. } => summary.squadron_bonuses += 1,
                GameEvent::LifeLost { .. } => summary.lives_lost += 1,
                GameEvent::AchievementUnlocked { achievement } => {
                    summary.achievements.push(*achievement)
                }
                _ => {}
            }
        }
        summary.phase = snapshot.phase;
        summary.score = snapshot.player.score;
        summary.lives = snapshot.player.lives;
        summary.bombs = snapshot.player.bombs;
        summary.ticks = snapshot.time.tick;
        summary.seconds = snapshot.time.elapsed_secs;

        if snapshot.phase == GamePhase::GameOver {
            info!(tick, "game over");
            break;
        }
    }
    summary.end_level = engine.level();
    Ok(summary)
}
