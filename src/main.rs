use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ledge::world::{CollisionTileSet, Level};
use ledge::{init_logging, GameThread, Simulation, SimulationConfig};
use log::info;

/// Headless runner for the Ledge simulation core
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Number of frames to run before exiting
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// JSON file overriding the default simulation budgets
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Level file to load
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Collision tile set for the level; tile 0 is a solid square otherwise
    #[arg(short, long, requires = "level")]
    tiles: Option<PathBuf>,
}

fn load_tiles(args: &Args, config: &SimulationConfig) -> Result<CollisionTileSet> {
    if let Some(path) = &args.tiles {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        return CollisionTileSet::from_bytes(&bytes)
            .with_context(|| format!("decoding {}", path.display()));
    }
    let mut tiles = CollisionTileSet::new();
    tiles.set_tile(0, CollisionTileSet::solid_square(config.tile_extent()));
    Ok(tiles)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => SimulationConfig::from_path(path)?,
        None => SimulationConfig::default(),
    };
    let mut simulation = Simulation::new(config.clone());
    if let Some(path) = &args.level {
        let level = Level::from_path(path, config.tile_extent())
            .with_context(|| format!("loading level {}", path.display()))?;
        simulation.load_level(level, load_tiles(&args, &config)?);
    }

    let game = GameThread::spawn(simulation, Some(args.frames))?;
    let finished = game.join()?;
    info!(
        "ran {} frames, {:.2}s of game time",
        finished.frame(),
        finished.context().time.game_time()
    );
    Ok(())
}
