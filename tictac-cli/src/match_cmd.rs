//! Match command - self-play games between two AI configurations
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::{ensure, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use tictac_core::{play_game, AiConfig, Difficulty, Mark, MoveSelector, Outcome, TieBreak};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Difficulty of the first AI (easy, medium, hard)
    #[arg(long, default_value = "hard")]
    pub first: Difficulty,

    /// Difficulty of the second AI (easy, medium, hard)
    #[arg(long, default_value = "hard")]
    pub second: Difficulty,

    /// Number of games to play (will alternate who moves first)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Pick randomly among equally scored best moves
    #[arg(long)]
    pub random_ties: bool,

    /// Play games on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Which AI won a game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GameResult {
    FirstWins,
    SecondWins,
    Draw,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    /// True when the first AI played X (and so moved first)
    first_played_x: bool,
    result: GameResult,
    moves: Vec<usize>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
    avg_moves: f32,
}

/// Per-game setup, prepared up front so games can run in any order
#[derive(Clone, Copy)]
struct GameConfig {
    game_number: usize,
    first_played_x: bool,
    seed: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// This function reads like a table of contents:
/// 1. Check arguments
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    ensure!(args.games > 0, "--games must be at least 1");

    tracing::info!(
        "Starting match: {} vs {} ({} games{})",
        args.first,
        args.second,
        args.games,
        if args.parallel { ", parallel" } else { "" }
    );

    let results = play_match(&args, seed);

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(args: &MatchArgs, seed: Option<u64>) -> MatchResults {
    let mut rng = create_rng(seed);
    let configs: Vec<GameConfig> = (0..args.games)
        .map(|i| GameConfig {
            game_number: i + 1,
            // Alternate colors for fairness
            first_played_x: i % 2 == 0,
            seed: rng.gen(),
        })
        .collect();

    let games: Vec<GameRecord> = if args.parallel {
        configs.par_iter().map(|gc| play_single_game(args, gc)).collect()
    } else {
        configs.iter().map(|gc| play_single_game(args, gc)).collect()
    };

    for record in &games {
        tracing::debug!(
            "Game {}: {:?} ({} moves)",
            record.game_number,
            record.result,
            record.moves.len()
        );
    }

    compute_match_statistics(games)
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results, args);
    } else {
        print_text_results(results, args);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play a single game between the two configured AIs
fn play_single_game(args: &MatchArgs, gc: &GameConfig) -> GameRecord {
    let tie_break = if args.random_ties {
        TieBreak::Random
    } else {
        TieBreak::First
    };
    let first = AiConfig::new(args.first).with_tie_break(tie_break);
    let second = AiConfig::new(args.second).with_tie_break(tie_break);

    let mut first_ai = MoveSelector::with_seed(first, gc.seed);
    let mut second_ai = MoveSelector::with_seed(second, gc.seed.wrapping_add(1));

    let game = if gc.first_played_x {
        play_game(&mut first_ai, &mut second_ai)
    } else {
        play_game(&mut second_ai, &mut first_ai)
    };

    let result = match game.outcome {
        Outcome::Draw => GameResult::Draw,
        Outcome::Win { mark, .. } => {
            if (mark == Mark::X) == gc.first_played_x {
                GameResult::FirstWins
            } else {
                GameResult::SecondWins
            }
        }
    };

    GameRecord {
        game_number: gc.game_number,
        first_played_x: gc.first_played_x,
        result,
        moves: game.moves,
    }
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |r: GameResult| games.iter().filter(|g| g.result == r).count();
    let first_wins = count(GameResult::FirstWins);
    let second_wins = count(GameResult::SecondWins);
    let draws = count(GameResult::Draw);

    let total_moves: usize = games.iter().map(|g| g.moves.len()).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        first_wins,
        second_wins,
        draws,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Cells in play order, 1-based as shown to players
fn format_moves(moves: &[usize]) -> String {
    moves
        .iter()
        .map(|m| (m + 1).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print results as JSON
fn print_json_results(results: &MatchResults, args: &MatchArgs) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        first_played_x: bool,
        result: String,
        moves: Vec<usize>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        first: String,
        second: String,
        total_games: usize,
        first_wins: usize,
        second_wins: usize,
        draws: usize,
        avg_moves: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        first: args.first.to_string(),
        second: args.second.to_string(),
        total_games: results.games.len(),
        first_wins: results.first_wins,
        second_wins: results.second_wins,
        draws: results.draws,
        avg_moves: results.avg_moves,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                first_played_x: g.first_played_x,
                result: format!("{:?}", g.result),
                moves: g.moves.clone(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults, args: &MatchArgs) {
    let total = results.games.len();

    println!("\n=== Match Results: {} vs {} ===", args.first, args.second);
    println!("Total games: {}", total);
    println!(
        "First wins:  {} ({:.1}%)",
        results.first_wins,
        percent(results.first_wins, total)
    );
    println!(
        "Second wins: {} ({:.1}%)",
        results.second_wins,
        percent(results.second_wins, total)
    );
    println!(
        "Draws:       {} ({:.1}%)",
        results.draws,
        percent(results.draws, total)
    );
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {} (first AI as {}): {:?} [{}]",
            game.game_number,
            if game.first_played_x { 'X' } else { 'O' },
            game.result,
            format_moves(&game.moves)
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(first: Difficulty, second: Difficulty, games: usize, parallel: bool) -> MatchArgs {
        MatchArgs {
            first,
            second,
            games,
            random_ties: false,
            parallel,
            json: false,
        }
    }

    fn record(result: GameResult, moves: usize) -> GameRecord {
        GameRecord {
            game_number: 1,
            first_played_x: true,
            result,
            moves: (0..moves).collect(),
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.first_wins, 0);
        assert_eq!(results.second_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_moves, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(GameResult::FirstWins, 5),
            record(GameResult::SecondWins, 6),
            record(GameResult::FirstWins, 7),
            record(GameResult::Draw, 9),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.first_wins, 2);
        assert_eq!(results.second_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_moves, 6.75);
    }

    #[test]
    fn test_hard_match_is_all_draws() {
        let results = play_match(&args(Difficulty::Hard, Difficulty::Hard, 6, false), Some(1));
        assert_eq!(results.draws, 6);
        assert!(results.games.iter().all(|g| g.moves.len() == 9));
    }

    #[test]
    fn test_colors_alternate() {
        let results = play_match(&args(Difficulty::Easy, Difficulty::Easy, 4, false), Some(3));
        let colors: Vec<bool> = results.games.iter().map(|g| g.first_played_x).collect();
        assert_eq!(colors, vec![true, false, true, false]);
    }

    #[test]
    fn test_hard_never_loses_to_easy() {
        let results = play_match(&args(Difficulty::Hard, Difficulty::Easy, 20, true), Some(5));
        assert_eq!(results.second_wins, 0);
        assert_eq!(results.games.len(), 20);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let seq = play_match(&args(Difficulty::Medium, Difficulty::Easy, 8, false), Some(42));
        let par = play_match(&args(Difficulty::Medium, Difficulty::Easy, 8, true), Some(42));
        let moves = |r: &MatchResults| r.games.iter().map(|g| g.moves.clone()).collect::<Vec<_>>();
        assert_eq!(moves(&seq), moves(&par));
    }

    #[test]
    fn test_format_moves_one_based() {
        assert_eq!(format_moves(&[4, 0, 8]), "5 1 9");
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }
}
