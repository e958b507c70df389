//! Game session for tictac.
//!
//! Owns the one match the server runs: who is connected, who is playing,
//! whose turn it is, and why a match ended.
//!
//! # Key types
//!
//! - [`GameSession`]: the synchronous state machine. Every notification
//!   returns the events to broadcast.
//! - [`SessionHandle`]: talks to the session actor, a single Tokio task
//!   that owns the `GameSession` and every connection's outbound channel,
//!   so notifications from many connection tasks are applied one at a time.
//! - [`EndCause`] / [`Slot`]: why a match ended and who was involved.
//! - [`SessionState`]: lifecycle state derived from the roster.
//!
//! ```text
//! connection tasks ──commands──▶ session actor ──ServerEvent──▶ every connection
//! ```

mod actor;
mod error;
mod game;
mod outcome;
mod state;

pub use actor::{ConnectionSender, SessionHandle, SessionInfo, spawn_session};
pub use error::SessionError;
pub use game::GameSession;
pub use outcome::{EndCause, Slot};
pub use state::SessionState;
