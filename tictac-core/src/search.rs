//! Minimax search with alpha-beta pruning and a depth cutoff
//!
//! Scores are from the AI's point of view: a win found `d` plies below the
//! root child scores `WIN_SCORE - d`, a loss `d - WIN_SCORE`, a draw `0`.
//! Below the depth cap the static heuristic takes over.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Mark};
use crate::eval::{check_win, heuristic_score, WIN_SCORE};

// ============================================================================
// CONSTANTS
// ============================================================================

/// A cap at this depth is never reached before a terminal position
pub const FULL_DEPTH: u32 = 9;

const NEG_INF: i32 = i32::MIN;
const POS_INF: i32 = i32::MAX;

// ============================================================================
// TYPES
// ============================================================================

/// Score of playing `cell` at the root
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: i32,
    pub cell: usize,
}

/// Equally scored best root moves
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestMoves {
    pub score: i32,
    /// Ascending cell order
    pub cells: Vec<usize>,
}

/// Game-tree searcher for one AI mark and depth cap
#[derive(Clone, Debug)]
pub struct Searcher {
    ai: Mark,
    human: Mark,
    max_depth: u32,
    nodes: u64,
}

impl Searcher {
    pub fn new(ai: Mark, max_depth: u32) -> Self {
        Self {
            ai,
            human: ai.opponent(),
            max_depth,
            nodes: 0,
        }
    }

    pub fn ai(&self) -> Mark {
        self.ai
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Positions visited since construction or the last reset
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn reset_nodes(&mut self) {
        self.nodes = 0;
    }

    // ========================================================================
    // ROOT
    // ========================================================================

    /// Best AI move, the lowest cell index winning ties.
    ///
    /// Alpha is carried across root siblings, so later moves that cannot
    /// beat the current best are only bounded, never scored exactly.
    pub fn best_move(&mut self, board: &Board) -> Option<SearchResult> {
        let mut best: Option<SearchResult> = None;
        let mut alpha = NEG_INF;

        for cell in board.empty_cells() {
            let child = board.with_move(cell, self.ai);
            let score = self.search(&child, 0, false, alpha, POS_INF);

            if best.map_or(true, |b| score > b.score) {
                best = Some(SearchResult { score, cell });
            }
            alpha = alpha.max(score);
        }

        best
    }

    /// Every root move sharing the best score.
    ///
    /// Each sibling is searched with alpha one below the best so far, which
    /// keeps equal scores exact while still pruning worse moves.
    pub fn best_moves(&mut self, board: &Board) -> Option<BestMoves> {
        let mut best = NEG_INF;
        let mut cells = Vec::new();

        for cell in board.empty_cells() {
            let child = board.with_move(cell, self.ai);
            let score = self.search(&child, 0, false, best.saturating_sub(1), POS_INF);

            if score > best {
                best = score;
                cells.clear();
                cells.push(cell);
            } else if score == best {
                cells.push(cell);
            }
        }

        if cells.is_empty() {
            None
        } else {
            Some(BestMoves { score: best, cells })
        }
    }

    /// Exact score of every legal root move, in cell order
    pub fn score_moves(&mut self, board: &Board) -> Vec<SearchResult> {
        board
            .empty_cells()
            .map(|cell| {
                let child = board.with_move(cell, self.ai);
                let score = self.search(&child, 0, false, NEG_INF, POS_INF);
                SearchResult { score, cell }
            })
            .collect()
    }

    /// Same choice as `best_move`, found by plain minimax
    pub fn best_move_exhaustive(&mut self, board: &Board) -> Option<SearchResult> {
        let mut best: Option<SearchResult> = None;

        for cell in board.empty_cells() {
            let score = self.minimax(&board.with_move(cell, self.ai), 0, false);
            if best.map_or(true, |b| score > b.score) {
                best = Some(SearchResult { score, cell });
            }
        }

        best
    }

    // ========================================================================
    // ALPHA-BETA
    // ========================================================================

    /// Minimax value of `board` with alpha-beta pruning.
    ///
    /// `maximizing` is true when the AI is to move. Children are explored
    /// on copies, so `board` is never modified.
    pub fn search(
        &mut self,
        board: &Board,
        depth: u32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;

        if let Some(score) = self.terminal_score(board, depth) {
            return score;
        }
        if depth >= self.max_depth {
            return heuristic_score(board, self.ai, self.human);
        }

        if maximizing {
            let mut best = NEG_INF;
            for cell in board.empty_cells() {
                let child = board.with_move(cell, self.ai);
                let score = self.search(&child, depth + 1, false, alpha, beta);
                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = POS_INF;
            for cell in board.empty_cells() {
                let child = board.with_move(cell, self.human);
                let score = self.search(&child, depth + 1, true, alpha, beta);
                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }

    /// Plain minimax without pruning; same scores as `search`, more nodes
    pub fn minimax(&mut self, board: &Board, depth: u32, maximizing: bool) -> i32 {
        self.nodes += 1;

        if let Some(score) = self.terminal_score(board, depth) {
            return score;
        }
        if depth >= self.max_depth {
            return heuristic_score(board, self.ai, self.human);
        }

        let mark = if maximizing { self.ai } else { self.human };
        let scores = board
            .empty_cells()
            .map(|cell| self.minimax(&board.with_move(cell, mark), depth + 1, !maximizing));

        if maximizing {
            scores.max().unwrap_or(NEG_INF)
        } else {
            scores.min().unwrap_or(POS_INF)
        }
    }

    fn terminal_score(&self, board: &Board, depth: u32) -> Option<i32> {
        let depth = depth as i32;
        if check_win(board, self.ai).is_some() {
            Some(WIN_SCORE - depth)
        } else if check_win(board, self.human).is_some() {
            Some(depth - WIN_SCORE)
        } else if board.is_full() {
            Some(0)
        } else {
            None
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
