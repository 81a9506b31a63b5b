//! # Delve Command Line Entry Point
//!
//! Generates a dungeon, optionally walks the party through it and prints a
//! render of the result.

use clap::Parser;
use delve::{
    DelveResult, Difficulty, DungeonSession, GenerationConfig, RenderFormat, RenderOptions,
};
use log::{info, warn, LevelFilter};
use std::fs;
use std::path::PathBuf;

/// Command line arguments for the Delve dungeon core.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural dungeon generation with fog of war and party movement")]
#[command(version)]
struct Args {
    /// Dungeon template (small_dungeon, medium_dungeon, large_dungeon, cave_system, tower, temple, crypt)
    #[arg(short, long, default_value = "medium_dungeon")]
    template: String,

    /// Difficulty (easy, normal, hard, deadly)
    #[arg(short, long, default_value = "normal")]
    difficulty: String,

    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Exact number of rooms, overriding the template's range
    #[arg(short, long)]
    rooms: Option<u32>,

    /// Fog of war mode (none, partial, full)
    #[arg(long, default_value = "partial")]
    fog: String,

    /// Render format (text, vector, sprite-data)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Comma-separated moves to make before rendering, e.g. "s,s,e,east"
    #[arg(short, long)]
    walk: Option<String>,

    /// Also write the map as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Delve v{}", delve::VERSION);

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut config = GenerationConfig::for_template(&args.template, seed)
        .with_difficulty(Difficulty::from_name(&args.difficulty));
    config.room_count_override = args.rooms;

    // Parse before generating so bad flags fail fast
    let format: RenderFormat = args.format.parse()?;

    let session = DungeonSession::generate(&config);
    session.set_fog_mode(&args.fog)?;

    if let Some(walk) = &args.walk {
        for step in walk.split(',').map(str::trim).filter(|step| !step.is_empty()) {
            match session.move_direction(step) {
                Ok(result) => {
                    if let Some(event) = &result.room_entry_event {
                        info!(
                            "Entered room {} ({}) with {} encounters",
                            event.room_id,
                            event.room_type,
                            event.encounters.len()
                        );
                    }
                    for finding in &result.trap_findings {
                        info!("Trap at ({}, {}): {:?}", finding.x, finding.y, finding.outcome);
                    }
                }
                Err(err) => warn!("Move '{step}' rejected: {err}"),
            }
        }
    }

    let output = session.render(format, &RenderOptions::default())?;
    println!("{}", output.to_display_string()?);

    if let Some(path) = &args.output {
        let file = fs::File::create(path)?;
        session.snapshot()?.write_json(file)?;
        info!("Wrote map to {}", path.display());
    }

    Ok(())
}

/// Initializes env_logger at `log_level`; `RUST_LOG` takes precedence.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
}
