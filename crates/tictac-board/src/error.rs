//! Error types for the board engine.

/// A move the board refused to apply.
///
/// The board is left untouched whenever this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMove {
    /// The position is not in `1..=9`.
    #[error("position must be in [1,9], got {0}")]
    OutOfRange(u32),

    /// The target cell already holds a mark.
    #[error("position {0} already used")]
    Occupied(u32),
}
