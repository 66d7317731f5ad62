//! # Headless Runner
//!
//! Runs the engine without a window: loads a config and a level, ticks a
//! fixed number of frames on a simulated clock, plans every frame into a
//! recording backend and logs timing.
//!
//! ```text
//! RUST_LOG=ember=debug ember_headless --level assets/levels/jungle.toml --frames 600
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ember::shared::{Key, KeyInputEvent};
use ember::{EngineConfig, Game, GameResult, LevelDescription, RecordingBackend, DEFAULT_LEVEL};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ember_headless")]
#[command(about = "Runs an Ember level without a window")]
struct Cli {
    /// Engine configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Level file. The bundled jungle level runs when omitted.
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Frames to simulate.
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Steer the player in a square and fire every second.
    #[arg(long)]
    autopilot: bool,
}

/// Key pressed on frame `frame` when flying the autopilot.
fn autopilot_key(frame: u64, fps: u64) -> Option<Key> {
    let fps = fps.max(1);
    if frame % fps == fps / 2 {
        return Some(Key::Space);
    }
    if frame % (fps * 2) != 0 {
        return None;
    }
    Some(match (frame / (fps * 2)) % 4 {
        0 => Key::Right,
        1 => Key::Down,
        2 => Key::Left,
        _ => Key::Up,
    })
}

fn run(cli: &Cli) -> GameResult<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let mut game = Game::new(config);

    let info = match &cli.level {
        Some(path) => game.load_level_file(path, 0)?,
        None => game.load_level(&LevelDescription::from_toml_str(DEFAULT_LEVEL)?, 0)?,
    };
    tracing::info!(
        tiles = info.tiles,
        entities = info.entities,
        map = ?info.map_size,
        "level ready"
    );

    let dt = config.frame_seconds();
    let fps = u64::from(config.target_fps);
    let mut backend = RecordingBackend::default();

    for frame in 0..cli.frames {
        if !game.is_running() {
            break;
        }
        if cli.autopilot {
            if let Some(key) = autopilot_key(frame, fps) {
                game.queue_key(KeyInputEvent::pressed(key));
            }
        }
        let elapsed_ms = frame * 1_000 / fps.max(1);
        let stats = game.tick(dt, elapsed_ms);
        game.draw(&mut backend);

        if frame % fps.max(1) == 0 {
            tracing::debug!(
                frame,
                entities = game.registry().entity_count(),
                draw_commands = backend.commands.len(),
                collisions = stats.collisions,
                "tick"
            );
        }
    }

    game.stats().log_summary();
    tracing::info!(
        frames = game.frame_count(),
        entities = game.registry().entity_count(),
        "run finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "ember_headless failed");
            ExitCode::FAILURE
        }
    }
}
