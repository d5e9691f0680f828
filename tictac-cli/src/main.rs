//! TICTAC CLI - Command-line interface
//!
//! Commands:
//! - play: Play against the AI in the terminal
//! - match: Self-play games between two difficulty levels
//! - analyze: Score every move of a position

mod analyze;
mod match_cmd;
mod play;

use clap::{Parser, Subcommand};
use tictac_core::Mark;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tictac")]
#[command(about = "Tic-tac-toe engine with a three-tier AI opponent")]
struct Cli {
    /// Random seed for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the AI
    Play(play::PlayArgs),
    /// Run AI-vs-AI games
    Match(match_cmd::MatchArgs),
    /// Score every legal move of a position
    Analyze(analyze::AnalyzeArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Analyze(args) => analyze::run(args),
    }
}

/// Parse `x` / `o` (any case) for mark options
pub(crate) fn parse_mark(s: &str) -> Result<Mark, String> {
    match s.trim() {
        "x" | "X" => Ok(Mark::X),
        "o" | "O" => Ok(Mark::O),
        other => Err(format!("expected x or o, got {:?}", other)),
    }
}
