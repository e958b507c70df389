//! The 3×3 grid, marks, and the winner check.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::InvalidMove;

/// Board side length.
const SIZE: usize = 3;

// ---------------------------------------------------------------------------
// Marks and cells
// ---------------------------------------------------------------------------

/// The symbol a player writes into the board.
///
/// The first player always plays `X`, the second `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Returns the mark owned by a player slot: 0 → `X`, anything else → `O`.
    pub fn for_slot(slot: usize) -> Self {
        if slot == 0 { Self::X } else { Self::O }
    }

    /// Returns the slot (0 or 1) that plays this mark.
    pub fn slot(self) -> usize {
        match self {
            Self::X => 0,
            Self::O => 1,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Cell::from(*self).symbol())
    }
}

/// The content of one board cell.
///
/// On the wire each cell is a one-character string: `"."`, `"x"` or `"o"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Cell {
    #[default]
    #[serde(rename = ".")]
    Empty,
    #[serde(rename = "x")]
    X,
    #[serde(rename = "o")]
    O,
}

impl Cell {
    /// The one-character symbol used when printing the board.
    pub fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::X => 'x',
            Self::O => 'o',
        }
    }

    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Self::Empty => None,
            Self::X => Some(Mark::X),
            Self::O => Some(Mark::O),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Self::X,
            Mark::O => Self::O,
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A zero-based `(row, col)` pair on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub row: usize,
    pub col: usize,
}

/// Maps a 1-based position to grid coordinates in row-major order.
///
/// `row = (position - 1) / 3`, `col = (position - 1) % 3`.
pub fn position_to_coordinates(
    position: u32,
) -> Result<Coordinates, InvalidMove> {
    if !(1..=9).contains(&position) {
        return Err(InvalidMove::OutOfRange(position));
    }
    let index = (position - 1) as usize;
    Ok(Coordinates {
        row: index / SIZE,
        col: index % SIZE,
    })
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// How a finished board ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Three identical marks in a line.
    Winner(Mark),
    /// Every cell is filled and nobody has a line.
    Tie,
}

/// A 3×3 tic-tac-toe grid.
///
/// Serializes as a 3×3 array of cell symbols, e.g.
/// `[["x",".","."],[".","o","."],[".",".","."]]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; SIZE]; SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rows of the grid.
    pub fn rows(&self) -> &[[Cell; SIZE]; SIZE] {
        &self.cells
    }

    /// Returns the cell at the given coordinates.
    pub fn cell(&self, at: Coordinates) -> Cell {
        self.cells[at.row][at.col]
    }

    /// Returns `true` when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|c| *c != Cell::Empty))
    }

    /// Writes `mark` at the 1-based `position`.
    ///
    /// Returns the coordinates that were written, which is what
    /// [`check_winner`](Self::check_winner) needs next. Fails without
    /// touching the board if the position is outside `1..=9` or the cell
    /// is taken.
    pub fn place(
        &mut self,
        mark: Mark,
        position: u32,
    ) -> Result<Coordinates, InvalidMove> {
        let at = position_to_coordinates(position)?;
        let cell = &mut self.cells[at.row][at.col];
        if *cell != Cell::Empty {
            return Err(InvalidMove::Occupied(position));
        }
        *cell = mark.into();
        Ok(at)
    }

    /// Checks the lines passing through the last move.
    ///
    /// Only the row, the column, and whichever diagonals contain `last`
    /// are inspected, since a move can only complete a line through its
    /// own cell. A winning line always beats a full board.
    ///
    /// Returns `None` while the game can continue.
    pub fn check_winner(&self, last: Coordinates) -> Option<Outcome> {
        let Coordinates { row, col } = last;
        let b = &self.cells;

        let mut lines: Vec<[Cell; SIZE]> = vec![
            b[row],
            [b[0][col], b[1][col], b[2][col]],
        ];
        if row == col {
            lines.push([b[0][0], b[1][1], b[2][2]]);
        }
        if row + col == SIZE - 1 {
            lines.push([b[0][2], b[1][1], b[2][0]]);
        }

        let winner = lines.iter().find_map(|line| {
            let first = line[0].mark()?;
            line.iter()
                .all(|c| c.mark() == Some(first))
                .then_some(first)
        });

        match winner {
            Some(mark) => Some(Outcome::Winner(mark)),
            None if self.is_full() => Some(Outcome::Tie),
            None => None,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
        }
        Ok(())
    }
}
