//! Roster slots and the reasons a match can end.

use std::fmt;

use tictac_board::{Mark, Outcome};

/// A connection's position in the roster.
///
/// Slots 0 and 1 are the two players; everything from 2 up is a
/// spectator. Slot 0 moves first and writes `X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub usize);

impl Slot {
    pub const FIRST: Slot = Slot(0);
    pub const SECOND: Slot = Slot(1);

    /// Returns `true` for the two player slots.
    pub fn is_player(self) -> bool {
        self.0 < 2
    }

    /// The other player slot. Only meaningful for players.
    pub fn opponent(self) -> Slot {
        Slot((self.0 + 1) % 2)
    }

    /// The mark this slot writes. Only meaningful for players.
    pub fn mark(self) -> Mark {
        Mark::for_slot(self.0)
    }

    /// `"first"`, `"second"`, or `"spectator"`.
    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "first",
            1 => "second",
            _ => "spectator",
        }
    }
}

impl From<Mark> for Slot {
    fn from(mark: Mark) -> Self {
        Slot(mark.slot())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCause {
    /// The mark completed a line.
    Win(Mark),
    /// The board filled up without a line.
    Tie,
    /// The given slot resigned.
    Resignation(Slot),
    /// The given slot disconnected.
    Disconnect(Slot),
}

impl EndCause {
    /// The slot that won, or `None` for a tie.
    pub fn winner(self) -> Option<Slot> {
        match self {
            Self::Win(mark) => Some(mark.into()),
            Self::Tie => None,
            Self::Resignation(loser) | Self::Disconnect(loser) => {
                Some(loser.opponent())
            }
        }
    }

    /// The result line broadcast to every client.
    pub fn text(self) -> String {
        match self {
            Self::Tie => "Game is tied.".to_string(),
            Self::Win(mark) => {
                format!("Game won by {} player.", Slot::from(mark))
            }
            Self::Resignation(loser) => format!(
                "Game won by {} player due to resignation.",
                loser.opponent()
            ),
            Self::Disconnect(loser) => format!(
                "Game won by {} player since {} player disconnected.",
                loser.opponent(),
                loser
            ),
        }
    }
}

impl From<Outcome> for EndCause {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Winner(mark) => Self::Win(mark),
            Outcome::Tie => Self::Tie,
        }
    }
}
