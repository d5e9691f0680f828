//! Play command - interactive game against the AI on stdin/stdout
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), run_loop()
//! - Level 3: automated_turn(), handle_command()
//! - Level 4: parsing and rendering utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tictac_core::{
    Board, Difficulty, GameSession, Mark, MoveOutcome, SessionConfig, SessionState, Side,
    TieBreak,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// AI difficulty (easy, medium, hard)
    #[arg(long)]
    pub difficulty: Option<Difficulty>,

    /// Let the AI make the first move
    #[arg(long)]
    pub ai_first: bool,

    /// Your mark (x or o)
    #[arg(long, value_parser = crate::parse_mark)]
    pub mark: Option<Mark>,

    /// Pick randomly among equally scored best moves
    #[arg(long)]
    pub random_ties: bool,

    /// Session config JSON; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// One line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    /// 0-based cell
    Move(usize),
    New,
    Stats,
    ResetStats,
    SetDifficulty(Difficulty),
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  1-9               place your mark (cells numbered left to right, top to bottom)
  new               start a new game
  stats             show session totals
  reset-stats       zero the totals and start a new game
  difficulty LEVEL  easy, medium or hard (applies from the next AI move)
  help              show this message
  quit              leave";

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the session config from file and flags
/// 2. Run the input loop on stdin/stdout
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args, seed)?;
    tracing::info!(
        difficulty = %config.ai.difficulty,
        player = %config.player_mark,
        first = ?config.first,
        "starting session"
    );

    let mut session = GameSession::new(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_loop(&mut session, stdin.lock(), &mut stdout.lock())?;

    tracing::info!(games = session.stats().games_played(), "session ended");
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &PlayArgs, seed: Option<u64>) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load session config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    if let Some(difficulty) = args.difficulty {
        config.ai.difficulty = difficulty;
    }
    if args.ai_first {
        config = config.with_first(Side::Automated);
    }
    if let Some(mark) = args.mark {
        config = config.with_player_mark(mark);
    }
    if args.random_ties {
        config.ai = config.ai.with_tie_break(TieBreak::Random);
    }
    if let Some(seed) = seed {
        config.ai = config.ai.with_seed(seed);
    }

    Ok(config)
}

/// Drive `session` from `input` until `quit` or end of input
fn run_loop<R: BufRead, W: Write>(session: &mut GameSession, input: R, output: &mut W) -> Result<()> {
    writeln!(
        output,
        "You are {}, the AI is {} ({}). Type 'help' for commands.",
        session.player_mark(),
        session.ai_mark(),
        session.difficulty()
    )?;

    let mut lines = input.lines();
    loop {
        if session.state() == SessionState::AwaitingAutomatedMove {
            automated_turn(session, output)?;
            continue;
        }

        write!(output, "\n{}", render_board(session.board()))?;
        match session.state() {
            SessionState::Terminal(_) => write!(output, "Game over. 'new' to play again: ")?,
            _ => write!(output, "Your move (1-9): ")?,
        }
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => handle_command(session, command, output)?,
            Err(message) => writeln!(output, "{}", message)?,
        }
    }

    writeln!(output, "\n{}", session.stats())?;
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn automated_turn<W: Write>(session: &mut GameSession, output: &mut W) -> Result<()> {
    let report = session
        .request_automated_move()
        .context("Automated move failed")?;

    write!(
        output,
        "AI plays {} ({:.1}ms",
        report.cell + 1,
        report.elapsed.as_secs_f64() * 1000.0
    )?;
    if let Some(stats) = session.last_search() {
        write!(output, ", {} positions", stats.nodes)?;
    }
    writeln!(output, ")")?;

    announce(report.outcome, output)
}

fn handle_command<W: Write>(session: &mut GameSession, command: Command, output: &mut W) -> Result<()> {
    match command {
        Command::Move(cell) => match session.submit_player_move(cell) {
            Ok(report) => announce(report.outcome, output)?,
            Err(e) => writeln!(output, "Illegal move: {}", e)?,
        },
        Command::New => {
            session.reset_board();
            writeln!(output, "New game.")?;
        }
        Command::Stats => writeln!(output, "{}", session.stats())?,
        Command::ResetStats => {
            session.reset_stats();
            writeln!(output, "Totals cleared, new game.")?;
        }
        Command::SetDifficulty(difficulty) => {
            session.set_difficulty(difficulty);
            writeln!(output, "Difficulty set to {}.", difficulty)?;
        }
        Command::Help => writeln!(output, "{}", HELP)?,
        Command::Quit => {}
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("").to_ascii_lowercase();

    if let Ok(n) = head.parse::<usize>() {
        return match n {
            1..=9 => Ok(Command::Move(n - 1)),
            _ => Err(format!("Cells are numbered 1-9, got {}", n)),
        };
    }

    match head.as_str() {
        "new" | "n" => Ok(Command::New),
        "stats" | "s" => Ok(Command::Stats),
        "reset-stats" => Ok(Command::ResetStats),
        "difficulty" | "d" => {
            let level = words.next().ok_or("Usage: difficulty easy|medium|hard")?;
            level
                .parse()
                .map(Command::SetDifficulty)
                .map_err(|e: anyhow::Error| e.to_string())
        }
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command: {} (try 'help')", other)),
    }
}

fn announce<W: Write>(outcome: MoveOutcome, output: &mut W) -> Result<()> {
    match outcome {
        MoveOutcome::Continue => {}
        MoveOutcome::PlayerWin => writeln!(output, "You win!")?,
        MoveOutcome::OpponentWin => writeln!(output, "AI wins.")?,
        MoveOutcome::Draw => writeln!(output, "Draw.")?,
    }
    Ok(())
}

/// Grid with empty cells shown by their 1-based number
fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..3 {
        if row > 0 {
            out.push_str("---+---+---\n");
        }
        let cells: Vec<String> = (0..3)
            .map(|col| {
                let i = row * 3 + col;
                board
                    .get(i)
                    .map_or_else(|| (i + 1).to_string(), |m| m.to_string())
            })
            .collect();
        out.push_str(&format!(" {} | {} | {}\n", cells[0], cells[1], cells[2]));
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
