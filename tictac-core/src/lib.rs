//! TICTAC Core - Game engine and AI
//!
//! This crate provides the core game logic for 3x3 tic-tac-toe:
//! - Board model with a fixed line table
//! - Win detection and heuristic evaluation
//! - Minimax search with alpha-beta pruning and depth cutoff
//! - Tiered move selection (easy, medium, hard)
//! - Game session state machine with score bookkeeping

pub mod board;
pub mod error;
pub mod eval;
pub mod search;
pub mod ai;
pub mod config;
pub mod session;

// Re-exports for convenient access
pub use board::{Board, Cell, Line, Mark, CELLS, CENTER, CORNERS, EDGES, LINES};
pub use error::{BoardParseError, IllegalMove};
pub use eval::{check_win, heuristic_score, outcome, winner, Outcome, WIN_SCORE};
pub use search::{BestMoves, SearchResult, Searcher, FULL_DEPTH};
pub use ai::{play_game, winning_cell, MoveSelector, PlayedGame, SearchStats, OPENING_CELLS};
pub use config::{AiConfig, Difficulty, SessionConfig, TieBreak};
pub use session::{
    AutomatedMoveReport, GameSession, MoveOutcome, MoveReport, SessionState, SessionStats, Side,
};
