//! Tiered move selection for the automated player

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Mark, CENTER, CELLS, CORNERS, EDGES};
use crate::config::{AiConfig, Difficulty, TieBreak};
use crate::eval::{check_win, outcome, Outcome};
use crate::search::Searcher;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Cells the search policy opens with on an empty board
pub const OPENING_CELLS: [usize; 5] = [0, 2, 4, 6, 8];

// ============================================================================
// MOVE SELECTOR
// ============================================================================

/// Statistics of the most recent search-policy move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub score: i32,
    pub nodes: u64,
    /// Number of root moves sharing the best score (1 under `TieBreak::First`)
    pub candidates: usize,
}

/// Automated player: one policy per difficulty tier
#[derive(Clone)]
pub struct MoveSelector {
    config: AiConfig,
    rng: ChaCha8Rng,
    last_search: Option<SearchStats>,
}

impl MoveSelector {
    /// Seeded from `config.seed`, or from entropy when unset
    pub fn new(config: AiConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            last_search: None,
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self::new(AiConfig {
            seed: Some(seed),
            ..config
        })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    /// Applies from the next selected move on
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    /// Search statistics of the last move, `None` unless it came from search
    pub fn last_search(&self) -> Option<SearchStats> {
        self.last_search
    }

    /// Pick a cell for `ai`, `None` on a full board
    pub fn select_move(&mut self, board: &Board, ai: Mark) -> Option<usize> {
        self.last_search = None;
        if board.is_full() {
            return None;
        }

        let cell = match self.config.difficulty {
            Difficulty::Easy => self.random_move(board),
            Difficulty::Medium => self.rule_move(board, ai),
            Difficulty::Hard => self.search_move(board, ai),
        };

        tracing::debug!(
            difficulty = %self.config.difficulty,
            mark = %ai,
            cell = ?cell,
            "selected move"
        );
        cell
    }

    // ========================================================================
    // POLICIES
    // ========================================================================

    /// Uniform over empty cells
    fn random_move(&mut self, board: &Board) -> Option<usize> {
        let empties: Vec<usize> = board.empty_cells().collect();
        empties.choose(&mut self.rng).copied()
    }

    /// First rule that applies: win, block, centre, corner, edge
    fn rule_move(&mut self, board: &Board, ai: Mark) -> Option<usize> {
        if let Some(cell) = winning_cell(board, ai) {
            return Some(cell);
        }
        if let Some(cell) = winning_cell(board, ai.opponent()) {
            return Some(cell);
        }
        if board.is_vacant(CENTER) {
            return Some(CENTER);
        }
        if let Some(cell) = self.random_vacant(board, &CORNERS) {
            return Some(cell);
        }
        if let Some(cell) = self.random_vacant(board, &EDGES) {
            return Some(cell);
        }
        self.random_move(board)
    }

    /// Random opening on an empty board, alpha-beta search otherwise
    fn search_move(&mut self, board: &Board, ai: Mark) -> Option<usize> {
        if board.is_empty() {
            return OPENING_CELLS.choose(&mut self.rng).copied();
        }

        let mut searcher = Searcher::new(ai, self.config.search_depth());
        let (cell, score, candidates) = match self.config.tie_break {
            TieBreak::First => {
                let best = searcher.best_move(board)?;
                (best.cell, best.score, 1)
            }
            TieBreak::Random => {
                let best = searcher.best_moves(board)?;
                let cell = *best.cells.choose(&mut self.rng)?;
                (cell, best.score, best.cells.len())
            }
        };

        let stats = SearchStats {
            score,
            nodes: searcher.nodes(),
            candidates,
        };
        tracing::trace!(?stats, "search finished");
        self.last_search = Some(stats);

        Some(cell)
    }

    fn random_vacant(&mut self, board: &Board, cells: &[usize]) -> Option<usize> {
        let vacant: Vec<usize> = cells.iter().copied().filter(|&c| board.is_vacant(c)).collect();
        vacant.choose(&mut self.rng).copied()
    }
}

/// Lowest empty cell that completes a line for `mark`
pub fn winning_cell(board: &Board, mark: Mark) -> Option<usize> {
    board
        .empty_cells()
        .find(|&cell| check_win(&board.with_move(cell, mark), mark).is_some())
}

// ============================================================================
// SELF-PLAY
// ============================================================================

/// A finished automated game
#[derive(Clone, Debug)]
pub struct PlayedGame {
    pub board: Board,
    pub moves: Vec<usize>,
    pub outcome: Outcome,
}

/// Play one game between two selectors, `x` moving first
pub fn play_game(x: &mut MoveSelector, o: &mut MoveSelector) -> PlayedGame {
    let mut board = Board::new();
    let mut moves = Vec::with_capacity(CELLS);
    let mut mark = Mark::X;

    while outcome(&board).is_none() {
        let selector = match mark {
            Mark::X => &mut *x,
            Mark::O => &mut *o,
        };
        let Some(cell) = selector.select_move(&board, mark) else {
            break;
        };
        board = board.with_move(cell, mark);
        moves.push(cell);
        mark = mark.opponent();
    }

    PlayedGame {
        board,
        moves,
        outcome: outcome(&board).unwrap_or(Outcome::Draw),
    }
}

// ============================================================================
// TESTS
// ============================================================================
