use chase_engine::save::MAX_SIZE;
use chase_engine::session::INITIAL_LIVES;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

pub const DEFAULT_SIZE: usize = 10;
pub const MIN_SIZE: usize = 3;
pub const DEFAULT_OUTPUT: &str = "chase.board";

/// Grid chase: eat the dots, dodge the pursuers.
#[derive(Parser, Debug)]
#[command(name = "chase", version, about)]
pub struct Args {
    /// Board size for a new game (values outside 3..=1024 fall back to 10)
    #[arg(short, long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Load the game from this board file instead of starting a new one
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where the board is saved when the game ends
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Record a JSON replay of every turn to this file
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Seed for bonus placement and autoplay
    #[arg(long)]
    seed: Option<u64>,

    /// Don't place a bonus item on the board
    #[arg(long)]
    no_bonus: bool,

    /// Let a random agent play this many turns instead of reading commands
    #[arg(long, value_name = "TURNS")]
    autoplay: Option<usize>,

    /// Lives the player starts with, each capture costs one
    #[arg(short, long, default_value_t = INITIAL_LIVES)]
    lives: usize,

    /// What log level to use
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

/// Where the board comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardSource {
    Fresh(usize),
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub source: BoardSource,
    pub output: PathBuf,
    pub replay: Option<PathBuf>,
    pub seed: u64,
    pub bonus: bool,
    pub autoplay: Option<usize>,
    pub lives: usize,
}

impl Config {
    pub fn from_args(args: Args) -> Config {
        let source = match args.input {
            Some(path) => BoardSource::File(path),
            None => BoardSource::Fresh(sanitize_size(args.size)),
        };

        Config {
            source,
            output: args.output,
            replay: args.replay,
            seed: args.seed.unwrap_or_else(rand::random),
            bonus: !args.no_bonus,
            autoplay: args.autoplay,
            lives: args.lives.max(1),
        }
    }
}

fn sanitize_size(size: usize) -> usize {
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        tracing::warn!("Board size {size} is out of range, using {DEFAULT_SIZE}");
        return DEFAULT_SIZE;
    }
    size
}
