//! Session lifecycle state.

/// Where the session is in its lifecycle.
///
/// Derived from the roster length and whether a match is live, so it can
/// never disagree with them:
///
/// ```text
/// Empty ⇄ Waiting → InProgress → Ended
///   ▲        ▲          │          │
///   └────────┴──────────┴──────────┘  (disconnects)
/// ```
///
/// - **Empty**: nobody connected.
/// - **Waiting**: one connection, waiting for an opponent.
/// - **InProgress**: a board is live and moves are accepted.
/// - **Ended**: two or more connections but no live match. A new match
///   only starts when a connect brings the roster to exactly two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Waiting,
    InProgress,
    Ended,
}

impl SessionState {
    /// Computes the state from the roster length and the in-progress flag.
    pub fn derive(roster_len: usize, in_progress: bool) -> Self {
        match (in_progress, roster_len) {
            (true, _) => Self::InProgress,
            (false, 0) => Self::Empty,
            (false, 1) => Self::Waiting,
            (false, _) => Self::Ended,
        }
    }

    /// Returns `true` if moves are currently accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Waiting => write!(f, "Waiting"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
