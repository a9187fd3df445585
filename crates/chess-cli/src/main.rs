//! Command-line front end for the engine.
//!
//! Runs perft counts and searches against a position given as FEN plus
//! coordinate moves.

use anyhow::Context;
use chess_core::Fen;
use chess_engine::{Clock, Engine, EngineConfig, Position, SearchParams};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess")]
#[command(about = "Bitboard chess engine: perft and search")]
struct Args {
    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured number of search threads
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct PositionArgs {
    /// Starting position in FEN
    #[arg(long, default_value = Fen::STARTPOS)]
    fen: String,

    /// Coordinate moves played from the starting position
    #[arg(long, num_args = 1.., value_delimiter = ' ')]
    moves: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Count leaf nodes of the legal move tree
    Perft {
        #[command(flatten)]
        position: PositionArgs,

        #[arg(long, short)]
        depth: u32,
    },
    /// Leaf counts per root move
    Divide {
        #[command(flatten)]
        position: PositionArgs,

        #[arg(long, short)]
        depth: u32,
    },
    /// Search for the best move
    Search {
        #[command(flatten)]
        position: PositionArgs,

        /// Maximum depth in plies
        #[arg(long, short)]
        depth: Option<u8>,

        /// Fixed thinking time in milliseconds
        #[arg(long)]
        movetime: Option<u64>,

        /// Remaining clock time in milliseconds
        #[arg(long, conflicts_with = "movetime")]
        remaining: Option<u64>,

        /// Clock increment in milliseconds
        #[arg(long, default_value = "0", requires = "remaining")]
        increment: u64,

        /// Moves until the next time control
        #[arg(long, requires = "remaining")]
        movestogo: Option<u32>,
    },
}

fn load_position(args: &PositionArgs) -> anyhow::Result<Position> {
    let mut position = Position::from_fen(&args.fen).context("invalid FEN")?;
    position
        .apply_moves(&args.moves)
        .context("invalid move list")?;
    Ok(position)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(threads) = args.threads {
        config.threads = threads;
    }

    match args.command {
        Command::Perft { position, depth } => {
            let engine = engine_at(config, &position)?;
            let started = Instant::now();
            let nodes = engine.perft(depth);
            let elapsed = started.elapsed();
            println!("nodes {nodes}");
            println!(
                "time {}ms nps {}",
                elapsed.as_millis(),
                (nodes as f64 / elapsed.as_secs_f64().max(1e-9)) as u64
            );
        }
        Command::Divide { position, depth } => {
            let engine = engine_at(config, &position)?;
            let divided = engine.divide(depth);
            let total: u64 = divided.iter().map(|(_, n)| n).sum();
            for (m, nodes) in &divided {
                println!("{m}: {nodes}");
            }
            println!();
            println!("moves {} nodes {total}", divided.len());
        }
        Command::Search {
            position,
            depth,
            movetime,
            remaining,
            increment,
            movestogo,
        } => {
            let mut engine = engine_at(config, &position)?;
            let params = SearchParams {
                depth,
                move_time: movetime.map(Duration::from_millis),
                clock: remaining.map(|remaining| Clock {
                    remaining: Duration::from_millis(remaining),
                    increment: Duration::from_millis(increment),
                    moves_to_go: movestogo,
                }),
                infinite: false,
            };
            let result = engine.search_with_progress(&params, |r| println!("info {r}"))?;
            if result.best_move.is_null() {
                println!("bestmove (none)");
            } else {
                println!("bestmove {}", result.best_move);
            }
        }
    }
    Ok(())
}

fn engine_at(config: EngineConfig, args: &PositionArgs) -> anyhow::Result<Engine> {
    let position = load_position(args)?;
    let mut engine = Engine::new(config)?;
    engine.set_position(position);
    Ok(engine)
}
