//! Board engine for tictac.
//!
//! Pure game rules with no I/O: create an empty 3×3 [`Board`], place a
//! [`Mark`] at a 1-based position, and check whether the last move
//! produced a winner or a tie.
//!
//! Positions are numbered like a phone keypad read row by row:
//!
//! ```text
//!  1 | 2 | 3
//!  4 | 5 | 6
//!  7 | 8 | 9
//! ```

mod board;
mod error;

pub use board::{Board, Cell, Coordinates, Mark, Outcome, position_to_coordinates};
pub use error::InvalidMove;
