//! Events that travel on the wire.
//!
//! Every frame is one named event. Both directions use the same
//! adjacently tagged shape so a client can dispatch on a single field:
//!
//! ```text
//! { "event": "MatchStarted", "data": { "firstPlayerId": "conn-1", ... } }
//! ```
//!
//! Payload field names are camelCase to match what browser clients expect.

use serde::{Deserialize, Deserializer, Serialize};
use tictac_board::Board;
use tictac_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The first frame on every connection, sent to that connection only.
///
/// Lets a client recognise its own id in [`MatchStarted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub connection_id: ConnectionId,
}

/// Two players are seated and a new board is live. Roster order decides
/// who moves first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStarted {
    pub first_player_id: ConnectionId,
    pub second_player_id: ConnectionId,
}

/// The full board after an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardUpdated {
    pub board: Board,
}

/// The match is over. `text` is the human-readable result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEnded {
    pub text: String,
}

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    Welcome(Welcome),
    MatchStarted(MatchStarted),
    BoardUpdated(BoardUpdated),
    MatchEnded(MatchEnded),
}

impl ServerEvent {
    /// The event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welcome(_) => "Welcome",
            Self::MatchStarted(_) => "MatchStarted",
            Self::BoardUpdated(_) => "BoardUpdated",
            Self::MatchEnded(_) => "MatchEnded",
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// A move or a resignation.
///
/// Both fields are optional on the wire, and either may be `null`.
/// `resign` wins over `position` when both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub resign: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl MoveEvent {
    /// A mark at the 1-based `position`.
    pub fn at(position: u32) -> Self {
        Self {
            position: Some(position),
            resign: false,
        }
    }

    /// Gives up the current match.
    pub fn resignation() -> Self {
        Self {
            position: None,
            resign: true,
        }
    }
}

/// Everything a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    Move(MoveEvent),
}
