//! Game session: turn sequencing and score bookkeeping
//!
//! The session owns the live board and is the only place it changes. A
//! front end drives it through `submit_player_move` and
//! `request_automated_move` and renders whatever the reports say.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::ai::{MoveSelector, SearchStats};
use crate::board::{Board, Line, Mark};
use crate::config::{Difficulty, SessionConfig};
use crate::error::IllegalMove;
use crate::eval::check_win;

// ============================================================================
// TYPES
// ============================================================================

/// The two participants of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Automated,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Automated,
            Side::Automated => Side::Player,
        }
    }
}

/// Result of a single move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Continue,
    PlayerWin,
    OpponentWin,
    Draw,
}

impl MoveOutcome {
    pub fn is_terminal(self) -> bool {
        self != MoveOutcome::Continue
    }
}

/// Where the session is in the turn cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingPlayerMove,
    AwaitingAutomatedMove,
    /// Game finished; holds the final outcome
    Terminal(MoveOutcome),
}

impl SessionState {
    fn awaiting(side: Side) -> Self {
        match side {
            Side::Player => SessionState::AwaitingPlayerMove,
            Side::Automated => SessionState::AwaitingAutomatedMove,
        }
    }
}

/// What the front end needs after an accepted move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    pub cell: usize,
    pub outcome: MoveOutcome,
    /// Set when the move completed a line
    pub winning_line: Option<Line>,
}

/// An automated move plus the time spent choosing it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatedMoveReport {
    pub cell: usize,
    pub outcome: MoveOutcome,
    pub winning_line: Option<Line>,
    pub elapsed: Duration,
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Running totals across the games of one session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub player_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
    /// Automated moves whose thinking time was recorded
    pub moves_timed: u32,
    pub total_move_time: Duration,
}

impl SessionStats {
    pub fn games_played(&self) -> u32 {
        self.player_wins + self.opponent_wins + self.draws
    }

    /// Player wins as a percentage of games played
    pub fn player_win_rate(&self) -> f64 {
        self.percent(self.player_wins)
    }

    pub fn opponent_win_rate(&self) -> f64 {
        self.percent(self.opponent_wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.percent(self.draws)
    }

    pub fn average_move_time(&self) -> Duration {
        if self.moves_timed == 0 {
            Duration::ZERO
        } else {
            self.total_move_time / self.moves_timed
        }
    }

    fn percent(&self, count: u32) -> f64 {
        let games = self.games_played();
        if games == 0 {
            0.0
        } else {
            count as f64 / games as f64 * 100.0
        }
    }

    fn record_outcome(&mut self, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::PlayerWin => self.player_wins += 1,
            MoveOutcome::OpponentWin => self.opponent_wins += 1,
            MoveOutcome::Draw => self.draws += 1,
            MoveOutcome::Continue => {}
        }
    }

    fn record_move_time(&mut self, elapsed: Duration) {
        self.moves_timed += 1;
        self.total_move_time += elapsed;
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games played: {}", self.games_played())?;
        writeln!(
            f,
            "Player wins:  {} ({:.1}%)",
            self.player_wins,
            self.player_win_rate()
        )?;
        writeln!(
            f,
            "AI wins:      {} ({:.1}%)",
            self.opponent_wins,
            self.opponent_win_rate()
        )?;
        writeln!(f, "Draws:        {} ({:.1}%)", self.draws, self.draw_rate())?;
        write!(
            f,
            "Avg AI move:  {:.3}s",
            self.average_move_time().as_secs_f64()
        )
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// One player against the automated opponent, over any number of games
#[derive(Clone)]
pub struct GameSession {
    player_mark: Mark,
    first: Side,
    board: Board,
    state: SessionState,
    stats: SessionStats,
    selector: MoveSelector,
    history: Vec<(Side, usize)>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            player_mark: config.player_mark,
            first: config.first,
            board: Board::new(),
            state: SessionState::awaiting(config.first),
            stats: SessionStats::default(),
            selector: MoveSelector::new(config.ai),
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Snapshot of the running totals
    pub fn stats(&self) -> SessionStats {
        self.stats.clone()
    }

    /// Moves of the current game in play order
    pub fn history(&self) -> &[(Side, usize)] {
        &self.history
    }

    pub fn player_mark(&self) -> Mark {
        self.player_mark
    }

    pub fn ai_mark(&self) -> Mark {
        self.player_mark.opponent()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.selector.difficulty()
    }

    /// Takes effect on the next automated move
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        tracing::debug!(%difficulty, "difficulty changed");
        self.selector.set_difficulty(difficulty);
    }

    /// Search statistics of the last automated move, if it searched
    pub fn last_search(&self) -> Option<SearchStats> {
        self.selector.last_search()
    }

    /// Apply the player's move; rejected moves change nothing
    pub fn submit_player_move(&mut self, cell: usize) -> Result<MoveReport, IllegalMove> {
        self.expect_turn(Side::Player)?;
        self.apply(Side::Player, cell)
    }

    /// Let the automated side choose and play its move
    pub fn request_automated_move(&mut self) -> Result<AutomatedMoveReport, IllegalMove> {
        self.expect_turn(Side::Automated)?;

        let ai = self.ai_mark();
        let start = Instant::now();
        let cell = self
            .selector
            .select_move(&self.board, ai)
            .ok_or(IllegalMove::GameOver)?;
        let elapsed = start.elapsed();
        self.stats.record_move_time(elapsed);

        let report = self.apply(Side::Automated, cell)?;
        Ok(AutomatedMoveReport {
            cell: report.cell,
            outcome: report.outcome,
            winning_line: report.winning_line,
            elapsed,
        })
    }

    /// Clear the board for a new game, keeping the totals
    pub fn reset_board(&mut self) {
        self.board = Board::new();
        self.history.clear();
        self.state = SessionState::awaiting(self.first);
    }

    /// New game and zeroed totals
    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
        self.reset_board();
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn mark_of(&self, side: Side) -> Mark {
        match side {
            Side::Player => self.player_mark,
            Side::Automated => self.ai_mark(),
        }
    }

    fn expect_turn(&self, side: Side) -> Result<(), IllegalMove> {
        match self.state {
            SessionState::Terminal(_) => Err(IllegalMove::GameOver),
            state if state == SessionState::awaiting(side) => Ok(()),
            _ => Err(IllegalMove::WrongTurn),
        }
    }

    fn apply(&mut self, side: Side, cell: usize) -> Result<MoveReport, IllegalMove> {
        let mark = self.mark_of(side);
        self.board.apply_move(cell, mark)?;
        self.history.push((side, cell));
        debug_assert!(self.well_formed(), "malformed board:\n{}", self.board);

        let (outcome, winning_line) = if let Some(line) = check_win(&self.board, mark) {
            let outcome = match side {
                Side::Player => MoveOutcome::PlayerWin,
                Side::Automated => MoveOutcome::OpponentWin,
            };
            (outcome, Some(line))
        } else if self.board.is_full() {
            (MoveOutcome::Draw, None)
        } else {
            (MoveOutcome::Continue, None)
        };

        self.state = if outcome.is_terminal() {
            self.stats.record_outcome(outcome);
            tracing::info!(?outcome, moves = self.history.len(), "game over");
            SessionState::Terminal(outcome)
        } else {
            SessionState::awaiting(side.other())
        };

        Ok(MoveReport {
            cell,
            outcome,
            winning_line,
        })
    }

    /// First mover never behind nor more than one ahead, at most one winner
    fn well_formed(&self) -> bool {
        let first = self.board.count(self.mark_of(self.first));
        let second = self.board.count(self.mark_of(self.first.other()));
        let both_won =
            check_win(&self.board, Mark::X).is_some() && check_win(&self.board, Mark::O).is_some();
        first >= second && first - second <= 1 && !both_won
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;

    fn session(difficulty: Difficulty) -> GameSession {
        GameSession::new(SessionConfig::default().with_ai(AiConfig::new(difficulty).with_seed(7)))
    }

    #[test]
    fn test_turn_cycle() {
        let mut s = session(Difficulty::Medium);
        assert_eq!(s.state(), SessionState::AwaitingPlayerMove);

        let report = s.submit_player_move(0).unwrap();
        assert_eq!(report.outcome, MoveOutcome::Continue);
        assert_eq!(s.state(), SessionState::AwaitingAutomatedMove);

        let ai = s.request_automated_move().unwrap();
        assert_eq!(ai.cell, 4);
        assert_eq!(s.board().get(4), Some(Mark::O));
        assert_eq!(s.state(), SessionState::AwaitingPlayerMove);
        assert_eq!(s.history(), &[(Side::Player, 0), (Side::Automated, 4)]);
        assert_eq!(s.stats().moves_timed, 1);
    }

    #[test]
    fn test_rejected_moves_change_nothing() {
        let mut s = session(Difficulty::Medium);
        s.submit_player_move(4).unwrap();

        // automated side's turn
        assert_eq!(s.submit_player_move(0), Err(IllegalMove::WrongTurn));
        s.request_automated_move().unwrap();
        assert_eq!(s.request_automated_move().unwrap_err(), IllegalMove::WrongTurn);

        let before = *s.board();
        assert_eq!(s.submit_player_move(4), Err(IllegalMove::Occupied { index: 4 }));
        assert_eq!(s.submit_player_move(9), Err(IllegalMove::OutOfRange { index: 9 }));
        assert_eq!(*s.board(), before);
        assert_eq!(s.state(), SessionState::AwaitingPlayerMove);
        assert_eq!(s.history().len(), 2);
    }

    /// Player always takes the lowest free cell
    fn play_out(s: &mut GameSession) -> MoveReport {
        loop {
            let report = match s.state() {
                SessionState::AwaitingPlayerMove => {
                    let cell = s.board().empty_cells().next().unwrap();
                    s.submit_player_move(cell).unwrap()
                }
                SessionState::AwaitingAutomatedMove => {
                    let r = s.request_automated_move().unwrap();
                    MoveReport {
                        cell: r.cell,
                        outcome: r.outcome,
                        winning_line: r.winning_line,
                    }
                }
                SessionState::Terminal(_) => panic!("game already over"),
            };
            if report.outcome.is_terminal() {
                return report;
            }
        }
    }

    #[test]
    fn test_finished_game_is_recorded() {
        for seed in 0..10 {
            let mut s = GameSession::new(
                SessionConfig::default().with_ai(AiConfig::new(Difficulty::Easy).with_seed(seed)),
            );
            let last = play_out(&mut s);
            let stats = s.stats();
            assert_eq!(stats.games_played(), 1);
            assert_eq!(s.state(), SessionState::Terminal(last.outcome));

            match last.outcome {
                MoveOutcome::PlayerWin | MoveOutcome::OpponentWin => {
                    let mark = if last.outcome == MoveOutcome::PlayerWin { Mark::X } else { Mark::O };
                    let line = last.winning_line.unwrap();
                    assert!(line.contains(last.cell));
                    assert!(line.cells.iter().all(|&c| s.board().get(c) == Some(mark)));
                    assert_eq!(stats.player_wins + stats.opponent_wins, 1);
                }
                MoveOutcome::Draw => {
                    assert_eq!(stats.draws, 1);
                    assert!(s.board().is_full());
                    assert!(last.winning_line.is_none());
                }
                MoveOutcome::Continue => unreachable!(),
            }
        }
    }

    #[test]
    fn test_moves_after_game_over_rejected() {
        let mut s = session(Difficulty::Hard);
        let last = play_out(&mut s);
        assert_eq!(last.outcome, MoveOutcome::OpponentWin);

        let before = *s.board();
        let cell = before.empty_cells().next().unwrap();
        assert_eq!(s.submit_player_move(cell), Err(IllegalMove::GameOver));
        assert_eq!(s.request_automated_move().unwrap_err(), IllegalMove::GameOver);
        assert_eq!(*s.board(), before);
        assert_eq!(s.stats().opponent_wins, 1);
    }

    #[test]
    fn test_reset_board_keeps_stats() {
        let mut s = session(Difficulty::Hard);
        play_out(&mut s);
        assert_eq!(s.stats().games_played(), 1);

        s.reset_board();
        assert!(s.board().is_empty());
        assert!(s.history().is_empty());
        assert_eq!(s.state(), SessionState::AwaitingPlayerMove);
        assert_eq!(s.stats().games_played(), 1);

        s.reset_stats();
        assert_eq!(s.stats(), SessionStats::default());
    }

    #[test]
    fn test_automated_first() {
        let config = SessionConfig::default()
            .with_first(Side::Automated)
            .with_ai(AiConfig::new(Difficulty::Hard).with_seed(3));
        let mut s = GameSession::new(config);
        assert_eq!(s.state(), SessionState::AwaitingAutomatedMove);
        assert_eq!(s.submit_player_move(0), Err(IllegalMove::WrongTurn));

        let report = s.request_automated_move().unwrap();
        assert!([0, 2, 4, 6, 8].contains(&report.cell));
        assert_eq!(s.board().get(report.cell), Some(Mark::O));

        s.reset_board();
        assert_eq!(s.state(), SessionState::AwaitingAutomatedMove);
    }

    #[test]
    fn test_set_difficulty() {
        let mut s = session(Difficulty::Easy);
        s.set_difficulty(Difficulty::Hard);
        assert_eq!(s.difficulty(), Difficulty::Hard);
        s.submit_player_move(0).unwrap();
        s.submit_player_move(1).unwrap_err();
        s.request_automated_move().unwrap();
        assert!(s.last_search().is_some());
    }

    #[test]
    fn test_stats_rates() {
        let stats = SessionStats {
            player_wins: 1,
            opponent_wins: 2,
            draws: 1,
            moves_timed: 4,
            total_move_time: Duration::from_millis(400),
        };
        assert_eq!(stats.games_played(), 4);
        assert_eq!(stats.player_win_rate(), 25.0);
        assert_eq!(stats.opponent_win_rate(), 50.0);
        assert_eq!(stats.draw_rate(), 25.0);
        assert_eq!(stats.average_move_time(), Duration::from_millis(100));
        assert!(stats.to_string().contains("Games played: 4"));

        assert_eq!(SessionStats::default().player_win_rate(), 0.0);
        assert_eq!(SessionStats::default().average_move_time(), Duration::ZERO);
    }
}
