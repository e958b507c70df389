//! Wire protocol for tictac.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Events** ([`ServerEvent`], [`ClientEvent`]): the named messages
//!   that travel on the wire, one JSON document per frame.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events are turned
//!   into bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Session (match state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BoardUpdated, ClientEvent, MatchEnded, MatchStarted, MoveEvent, ServerEvent, Welcome,
};

pub use tictac_board::Board;
pub use tictac_transport::ConnectionId;
