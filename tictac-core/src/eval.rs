//! Line checking and position evaluation

use serde::{Deserialize, Serialize};

use crate::board::{Board, Line, Mark, CENTER, LINES};

/// Base value of a won position; the search subtracts the ply depth
pub const WIN_SCORE: i32 = 10;

/// Per-line weight for two of one side's marks and an open third cell
const TWO_IN_LINE: i32 = 3;
/// Per-line weight for a lone mark with two open cells
const ONE_IN_LINE: i32 = 1;
/// Bonus for holding the centre
const CENTER_BONUS: i32 = 1;

/// How a finished game ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win { mark: Mark, line: Line },
    Draw,
}

/// First line fully occupied by `mark`, if any
pub fn check_win(board: &Board, mark: Mark) -> Option<Line> {
    LINES
        .iter()
        .copied()
        .find(|line| line.cells.iter().all(|&i| board.get(i) == Some(mark)))
}

/// Winning mark and its line
pub fn winner(board: &Board) -> Option<(Mark, Line)> {
    [Mark::X, Mark::O]
        .into_iter()
        .find_map(|mark| check_win(board, mark).map(|line| (mark, line)))
}

/// Terminal outcome, `None` while the game is still open
pub fn outcome(board: &Board) -> Option<Outcome> {
    if let Some((mark, line)) = winner(board) {
        Some(Outcome::Win { mark, line })
    } else if board.is_full() {
        Some(Outcome::Draw)
    } else {
        None
    }
}

/// Static estimate of a non-terminal board from the AI's point of view.
///
/// Lines holding only one side's marks count towards that side; mixed and
/// empty lines count for nothing. The centre adds a small bonus.
pub fn heuristic_score(board: &Board, ai: Mark, human: Mark) -> i32 {
    let lines: i32 = LINES.iter().map(|line| line_score(board, line, ai, human)).sum();

    let center = match board.get(CENTER) {
        Some(m) if m == ai => CENTER_BONUS,
        Some(m) if m == human => -CENTER_BONUS,
        _ => 0,
    };

    lines + center
}

fn line_score(board: &Board, line: &Line, ai: Mark, human: Mark) -> i32 {
    let count = |mark: Mark| line.cells.iter().filter(|&&i| board.get(i) == Some(mark)).count();

    match (count(ai), count(human)) {
        (2, 0) => TWO_IN_LINE,
        (0, 2) => -TWO_IN_LINE,
        (1, 0) => ONE_IN_LINE,
        (0, 1) => -ONE_IN_LINE,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_check_win_reports_line() {
        let b = board("XXXOO....");
        assert_eq!(check_win(&b, Mark::X).map(|l| l.cells), Some([0, 1, 2]));
        assert_eq!(check_win(&b, Mark::O), None);

        let diag = board("O.X.OX..O");
        assert_eq!(check_win(&diag, Mark::O).map(|l| l.cells), Some([0, 4, 8]));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let b = board("XOXXOOOXX");
        assert!(b.is_full());
        assert_eq!(check_win(&b, Mark::X), None);
        assert_eq!(check_win(&b, Mark::O), None);
        assert_eq!(outcome(&b), Some(Outcome::Draw));
    }

    #[test]
    fn test_outcome_open_game() {
        assert_eq!(outcome(&Board::new()), None);
        assert_eq!(outcome(&board("X...O....")), None);
    }

    #[test]
    fn test_win_on_last_cell_is_not_draw() {
        let b = board("XOXOXOOXX");
        assert!(b.is_full());
        assert!(matches!(outcome(&b), Some(Outcome::Win { mark: Mark::X, .. })));
    }

    #[test]
    fn test_heuristic_empty_board_is_zero() {
        assert_eq!(heuristic_score(&Board::new(), Mark::O, Mark::X), 0);
    }

    #[test]
    fn test_heuristic_center() {
        // centre sits on 4 lines (+1 each) plus the centre bonus
        let b = board("....O....");
        assert_eq!(heuristic_score(&b, Mark::O, Mark::X), 5);
        assert_eq!(heuristic_score(&b, Mark::X, Mark::O), -5);
    }

    #[test]
    fn test_heuristic_two_in_line() {
        // top row +3, columns 0 and 1 +1 each, row 2 and column 2 -1 each,
        // the 0-4-8 diagonal is mixed
        let b = board("OO......X");
        assert_eq!(heuristic_score(&b, Mark::O, Mark::X), 3 + 1 + 1 - 1 - 1);
    }

    #[test]
    fn test_heuristic_antisymmetric() {
        for s in ["X...O....", "XX.OO....", "XOX.O....", "X.O.X.O..", "XO.XO...."] {
            let b = board(s);
            assert_eq!(
                heuristic_score(&b, Mark::O, Mark::X),
                -heuristic_score(&b.swap_marks(), Mark::O, Mark::X),
                "board {}",
                s
            );
        }
    }
}
