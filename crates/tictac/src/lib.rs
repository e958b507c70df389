//! # tictac
//!
//! A real-time two-player tic-tac-toe server over WebSockets.
//!
//! The first two connections are paired into a match; anyone connecting
//! after them watches as a spectator. The server relays moves, enforces
//! turn order, and broadcasts every board update and the final result to
//! all connected clients.
//!
//! ```text
//! transport (bytes) → protocol (events) → session (match state) → broadcast
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tictac::prelude::*;
//!
//! # async fn run() -> Result<(), TictacError> {
//! let server = GameServerBuilder::new().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::TictacError;
pub use server::{GameServer, GameServerBuilder};

/// Everything needed to run a server or write a client against it.
pub mod prelude {
    pub use crate::{GameServer, GameServerBuilder, ServerConfig, TictacError};
    pub use tictac_board::{Board, Cell, Mark};
    pub use tictac_protocol::{
        BoardUpdated, ClientEvent, Codec, ConnectionId, JsonCodec, MatchEnded, MatchStarted,
        MoveEvent, ProtocolError, ServerEvent, Welcome,
    };
    pub use tictac_session::{SessionHandle, SessionInfo, SessionState};
}
