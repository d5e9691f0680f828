//! Analyze command - score every legal move of a position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: analyze_position(), report_results()
//! - Level 3: time_search()
//! - Level 4: formatting utilities

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;

use tictac_core::{outcome, Board, Mark, Outcome, SearchResult, Searcher, FULL_DEPTH};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Board as nine cells, row-major: X, O and `.` for empty (e.g. "XX.OO....")
    pub board: String,

    /// Mark to analyze for (defaults to the side to move)
    #[arg(long, value_parser = crate::parse_mark)]
    pub mark: Option<Mark>,

    /// Search depth cap
    #[arg(long, default_value_t = FULL_DEPTH)]
    pub depth: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Node count and wall time of one root search
#[derive(Clone, Copy, Debug)]
struct SearchTiming {
    best: Option<SearchResult>,
    nodes: u64,
    elapsed: Duration,
}

/// Everything the report shows
#[derive(Clone, Debug)]
struct Analysis {
    board: Board,
    mark: Mark,
    depth: u32,
    moves: Vec<SearchResult>,
    pruned: SearchTiming,
    plain: SearchTiming,
}

impl Analysis {
    fn agree(&self) -> bool {
        self.pruned.best == self.plain.best
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run analyze command
///
/// 1. Parse the board
/// 2. Stop early if the game is already decided
/// 3. Score every move and compare pruned against plain search
/// 4. Report
pub fn run(args: AnalyzeArgs) -> Result<()> {
    let board: Board = args
        .board
        .parse()
        .with_context(|| format!("Invalid board: {:?}", args.board))?;

    if let Some(result) = outcome(&board) {
        println!("{}", board);
        println!("Game already over: {}", describe_outcome(result));
        return Ok(());
    }

    let mark = args.mark.unwrap_or_else(|| board.to_move());
    tracing::info!(board = %board.to_compact(), %mark, depth = args.depth, "analyzing");

    let analysis = analyze_position(board, mark, args.depth);

    report_results(&analysis, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn analyze_position(board: Board, mark: Mark, depth: u32) -> Analysis {
    let moves = Searcher::new(mark, depth).score_moves(&board);

    let pruned = time_search(mark, depth, |s| s.best_move(&board));
    let plain = time_search(mark, depth, |s| s.best_move_exhaustive(&board));

    if pruned.best != plain.best {
        tracing::warn!(
            pruned = ?pruned.best,
            plain = ?plain.best,
            "pruned and plain search disagree"
        );
    }

    Analysis {
        board,
        mark,
        depth,
        moves,
        pruned,
        plain,
    }
}

fn report_results(analysis: &Analysis, json: bool) {
    if json {
        print_json_results(analysis);
    } else {
        print_text_results(analysis);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Run one root search on a fresh searcher and measure it
fn time_search<F>(mark: Mark, depth: u32, search: F) -> SearchTiming
where
    F: FnOnce(&mut Searcher) -> Option<SearchResult>,
{
    let mut searcher = Searcher::new(mark, depth);
    let start = Instant::now();
    let best = search(&mut searcher);
    SearchTiming {
        best,
        nodes: searcher.nodes(),
        elapsed: start.elapsed(),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn describe_outcome(result: Outcome) -> String {
    match result {
        Outcome::Win { mark, line } => {
            let cells: Vec<String> = line.cells.iter().map(|c| (c + 1).to_string()).collect();
            format!("{} wins on {}", mark, cells.join("-"))
        }
        Outcome::Draw => "draw".to_string(),
    }
}

fn describe_score(score: i32) -> &'static str {
    match score {
        s if s > 0 => "win",
        s if s < 0 => "loss",
        _ => "even",
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_millis() > 0 {
        format!("{:.2}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn print_json_results(analysis: &Analysis) {
    #[derive(serde::Serialize)]
    struct JsonSearch {
        cell: Option<usize>,
        score: Option<i32>,
        nodes: u64,
        micros: u128,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        board: String,
        mark: Mark,
        depth: u32,
        moves: Vec<SearchResult>,
        alpha_beta: JsonSearch,
        minimax: JsonSearch,
        agree: bool,
    }

    let search = |t: &SearchTiming| JsonSearch {
        cell: t.best.map(|b| b.cell),
        score: t.best.map(|b| b.score),
        nodes: t.nodes,
        micros: t.elapsed.as_micros(),
    };

    let output = JsonOutput {
        board: analysis.board.to_compact(),
        mark: analysis.mark,
        depth: analysis.depth,
        moves: analysis.moves.clone(),
        alpha_beta: search(&analysis.pruned),
        minimax: search(&analysis.plain),
        agree: analysis.agree(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(analysis: &Analysis) {
    println!("{}", analysis.board);
    println!(
        "=== Moves for {} (depth {}) ===",
        analysis.mark, analysis.depth
    );
    for m in &analysis.moves {
        println!(
            "  cell {}: {:>3}  {}",
            m.cell + 1,
            m.score,
            describe_score(m.score)
        );
    }

    println!("\n{:<12} {:>6} {:>10} {:>12}", "Search", "Cell", "Nodes", "Time");
    println!("{}", "-".repeat(44));
    for (name, t) in [("alpha-beta", &analysis.pruned), ("minimax", &analysis.plain)] {
        let cell = t.best.map_or("-".to_string(), |b| (b.cell + 1).to_string());
        println!(
            "{:<12} {:>6} {:>10} {:>12}",
            name,
            cell,
            t.nodes,
            format_duration(t.elapsed)
        );
    }

    if analysis.plain.nodes > 0 {
        println!(
            "\nPruning visited {:.1}% of the plain tree; choices {}",
            analysis.pruned.nodes as f64 / analysis.plain.nodes as f64 * 100.0,
            if analysis.agree() { "agree" } else { "DIFFER" }
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
