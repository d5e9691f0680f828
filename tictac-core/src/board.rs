//! 3x3 board geometry, marks and the fixed line table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BoardParseError, IllegalMove};

/// Number of cells on the board
pub const CELLS: usize = 9;

/// Centre cell (0-based, row-major)
pub const CENTER: usize = 4;

/// Corner cells
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Edge cells
pub const EDGES: [usize; 4] = [1, 3, 5, 7];

/// The symbol occupying a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A cell is either empty or holds a mark
pub type Cell = Option<Mark>;

/// Three cells that win the game when uniformly occupied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub cells: [usize; 3],
}

impl Line {
    const fn new(a: usize, b: usize, c: usize) -> Self {
        Self { cells: [a, b, c] }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.cells.contains(&index)
    }
}

/// All winning lines: rows, columns, diagonals
pub const LINES: [Line; 8] = [
    Line::new(0, 1, 2),
    Line::new(3, 4, 5),
    Line::new(6, 7, 8),
    Line::new(0, 3, 6),
    Line::new(1, 4, 7),
    Line::new(2, 5, 8),
    Line::new(0, 4, 8),
    Line::new(2, 4, 6),
];

/// Board state (copy to explore)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    pub const fn new() -> Self {
        Self { cells: [None; CELLS] }
    }

    pub const fn from_cells(cells: [Cell; CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    /// Mark at `index`, `None` when empty or off the board
    pub fn get(&self, index: usize) -> Cell {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_vacant(&self, index: usize) -> bool {
        index < CELLS && self.cells[index].is_none()
    }

    /// Place `mark` at `index`, rejecting off-board and occupied cells
    pub fn apply_move(&mut self, index: usize, mark: Mark) -> Result<(), IllegalMove> {
        match self.cells.get(index) {
            None => Err(IllegalMove::OutOfRange { index }),
            Some(Some(_)) => Err(IllegalMove::Occupied { index }),
            Some(None) => {
                self.cells[index] = Some(mark);
                Ok(())
            }
        }
    }

    /// Copy of this board with `mark` placed at a cell known to be empty
    pub fn with_move(&self, index: usize, mark: Mark) -> Self {
        debug_assert!(self.is_vacant(index), "cell {} is not vacant", index);
        let mut next = *self;
        next.cells[index] = Some(mark);
        next
    }

    /// Empty cell indices in ascending order
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|&&c| c == Some(mark)).count()
    }

    /// Every X becomes O and vice versa
    pub fn swap_marks(&self) -> Self {
        let mut cells = self.cells;
        for cell in cells.iter_mut() {
            *cell = cell.map(Mark::opponent);
        }
        Self { cells }
    }

    /// Mark counts differ by at most one, as alternating play requires
    pub fn is_balanced(&self) -> bool {
        self.count(Mark::X).abs_diff(self.count(Mark::O)) <= 1
    }

    /// Side to move assuming alternating play: the mark with fewer cells,
    /// X when the counts are equal
    pub fn to_move(&self) -> Mark {
        if self.count(Mark::O) < self.count(Mark::X) {
            Mark::O
        } else {
            Mark::X
        }
    }

    /// Nine characters, `.` for empty (the format `FromStr` accepts)
    pub fn to_compact(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.map_or('.', Mark::as_char))
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let cell = |col: usize| self.cells[row * 3 + col].map_or(' ', Mark::as_char);
            writeln!(f, " {} | {} | {}", cell(0), cell(1), cell(2))?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Accepts `X`, `O` (any case) and `.`, `_`, `-` for empty;
    /// whitespace, `|` and `/` are ignored as separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::with_capacity(CELLS);
        for ch in s.chars() {
            match ch {
                'X' | 'x' => cells.push(Some(Mark::X)),
                'O' | 'o' => cells.push(Some(Mark::O)),
                '.' | '_' | '-' => cells.push(None),
                c if c.is_whitespace() || c == '|' || c == '/' => {}
                c => return Err(BoardParseError::InvalidCell(c)),
            }
        }

        let cells: [Cell; CELLS] = cells
            .try_into()
            .map_err(|v: Vec<Cell>| BoardParseError::WrongLength(v.len()))?;
        let board = Board { cells };
        if !board.is_balanced() {
            return Err(BoardParseError::Unbalanced {
                x: board.count(Mark::X),
                o: board.count(Mark::O),
            });
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_move_changes_only_target() {
        let mut board: Board = "X...O....".parse().unwrap();
        let before = board;
        board.apply_move(7, Mark::X).unwrap();

        for i in 0..CELLS {
            if i == 7 {
                assert_eq!(board.get(i), Some(Mark::X));
            } else {
                assert_eq!(board.get(i), before.get(i), "cell {} changed", i);
            }
        }
    }

    #[test]
    fn test_apply_move_rejects_illegal() {
        let mut board = Board::new();
        board.apply_move(4, Mark::X).unwrap();

        assert_eq!(board.apply_move(4, Mark::O), Err(IllegalMove::Occupied { index: 4 }));
        assert_eq!(board.apply_move(9, Mark::O), Err(IllegalMove::OutOfRange { index: 9 }));
        assert_eq!(board.count(Mark::O), 0);
    }

    #[test]
    fn test_full_and_empty() {
        assert!(Board::new().is_empty());
        assert!(!Board::new().is_full());

        let full: Board = "XOXXOOOXX".parse().unwrap();
        assert!(full.is_full());
        assert_eq!(full.empty_cells().count(), 0);
    }

    #[test]
    fn test_empty_cells_ascending() {
        let board: Board = "X.O.X.O..".parse().unwrap();
        let empties: Vec<usize> = board.empty_cells().collect();
        assert_eq!(empties, vec![1, 3, 5, 7, 8]);
    }

    #[test]
    fn test_with_move_leaves_original() {
        let board = Board::new();
        let next = board.with_move(0, Mark::O);
        assert!(board.is_empty());
        assert_eq!(next.get(0), Some(Mark::O));
    }

    #[test]
    fn test_parse_separators_and_errors() {
        let board: Board = "XX_|OO_|___".parse().unwrap();
        assert_eq!(board.to_compact(), "XX.OO....");

        assert_eq!("XX".parse::<Board>(), Err(BoardParseError::WrongLength(2)));
        assert_eq!(
            "XXZ......".parse::<Board>(),
            Err(BoardParseError::InvalidCell('Z'))
        );
        assert_eq!(
            "XXX......".parse::<Board>(),
            Err(BoardParseError::Unbalanced { x: 3, o: 0 })
        );
    }

    #[test]
    fn test_to_move() {
        assert_eq!(Board::new().to_move(), Mark::X);
        assert_eq!("X........".parse::<Board>().unwrap().to_move(), Mark::O);
        assert_eq!("XO.......".parse::<Board>().unwrap().to_move(), Mark::X);
        assert_eq!("O........".parse::<Board>().unwrap().to_move(), Mark::X);
    }

    #[test]
    fn test_swap_marks() {
        let board: Board = "XO.......".parse().unwrap();
        assert_eq!(board.swap_marks().to_compact(), "OX.......");
    }

    #[test]
    fn test_lines_cover_center_four_times() {
        let through_center = LINES.iter().filter(|l| l.contains(CENTER)).count();
        assert_eq!(through_center, 4);
        for corner in CORNERS {
            assert_eq!(LINES.iter().filter(|l| l.contains(corner)).count(), 3);
        }
        for edge in EDGES {
            assert_eq!(LINES.iter().filter(|l| l.contains(edge)).count(), 2);
        }
    }

    #[test]
    fn test_display_grid() {
        let board: Board = "X...O....".parse().unwrap();
        let text = board.to_string();
        assert!(text.starts_with(" X |   |  \n"));
        assert_eq!(text.lines().count(), 5);
    }
}
