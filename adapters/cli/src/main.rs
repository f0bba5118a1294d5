#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Alienu arena headless.

mod config;
mod hud;
mod scene;
mod session;

use std::{path::PathBuf, time::Duration};

use alienu_core::Command;
use alienu_system_bootstrap::Bootstrap;
use alienu_system_city::instantiate;
use alienu_world::{query, World};
use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use crate::{
    config::GameConfig,
    hud::{HudFrame, LogHud},
    scene::SceneTally,
    session::{Autopilot, GameState},
};

/// Command-line arguments accepted by the Alienu binary.
#[derive(Debug, Parser)]
#[command(name = "alienu", about = "Generate a city arena and fight waves of aliens")]
struct CliArgs {
    /// Path to a toml file with [city], [waves], [ship] and [[catalog]] sections.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for city generation and spawn placement; overrides the config.
    #[arg(long)]
    seed: Option<u64>,
    /// Frames to simulate before giving up.
    #[arg(long, default_value_t = 3_600)]
    frames: u32,
    /// Simulated milliseconds per frame.
    #[arg(long = "frame-ms", default_value_t = 16)]
    frame_ms: u64,
    /// Let a scripted pilot shoot the aliens.
    #[arg(long)]
    autopilot: bool,
    /// Times to restart after the session ends.
    #[arg(long, default_value_t = 0)]
    restarts: u32,
}

/// Entry point for the Alienu command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.reseed(seed);
    }

    println!("{}", Bootstrap.welcome_banner(&World::new()));

    let autopilot = args
        .autopilot
        .then(|| Autopilot::new(Duration::from_millis(100), 50.0));
    let (mut game, report) = GameState::bootstrap(&config, autopilot)?;
    log::info!(
        "city: {} seeds placed, {} abandoned, {} buildings, {} aborted",
        report.spread.seeded,
        report.spread.abandoned,
        report.buildings_built,
        report.buildings_aborted
    );

    let mut scene = SceneTally::default();
    if let Some(plan) = query::city(game.world()) {
        let _ = instantiate(plan, &mut scene);
    }
    log::info!("scene: {}", scene.summary());

    let dt = Duration::from_millis(args.frame_ms.max(1));
    let mut hud = LogHud::default();
    let mut restarts_left = args.restarts;
    for _ in 0..args.frames {
        game.tick(dt);
        HudFrame::capture(game.world(), game.waves()).present(&mut hud);

        if query::outcome(game.world()).is_some() {
            if restarts_left == 0 {
                break;
            }
            restarts_left -= 1;
            game.submit(Command::Restart);
        }
    }

    match hud.status() {
        Some(status) => println!("{status}"),
        None => println!(
            "Stopped during wave {} with {} alien(s) remaining",
            game.waves().current_wave(),
            game.waves().live_enemy_count()
        ),
    }
    Ok(())
}
