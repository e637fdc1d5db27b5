//! Text console front end for the chase engine.
mod config;

use anyhow::{Context, Result};
use chase_engine::{Board, Session};
use clap::Parser;
use config::{Args, BoardSource, Config};
use std::io::{stdin, stdout};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbosity.tracing_level_filter());
    let config = Config::from_args(args);

    let board = match &config.source {
        BoardSource::Fresh(size) => Board::new(*size),
        BoardSource::File(path) => Board::load(path)
            .with_context(|| format!("Could not load board from {}", path.display()))?,
    }
    .with_replay(config.replay.clone());

    let mut session = Session::new(board, stdin().lock(), stdout().lock(), config.output.clone())
        .with_lives(config.lives);
    if config.bonus {
        session = session.with_bonus(config.seed);
    }

    let outcome = match config.autoplay {
        Some(turns) => session.autoplay(config.seed, turns),
        None => session.run(),
    }
    .context("Session failed")?;

    tracing::info!("Finished with {outcome:?}");
    Ok(())
}

/// Logs to stderr so the board on stdout stays readable.
/// `RUST_LOG` overrides the level picked from the command line.
fn setup_logging(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
