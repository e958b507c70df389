//! Error types for the session layer.

/// Errors returned by a [`SessionHandle`](crate::SessionHandle).
///
/// Rule violations inside a match are never errors; they are logged and
/// ignored by the [`GameSession`](crate::GameSession).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session actor has stopped, or its command channel is closed.
    #[error("game session is unavailable")]
    Unavailable,
}
