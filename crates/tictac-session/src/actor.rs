//! Session actor: a Tokio task that owns the [`GameSession`].
//!
//! Every connection task talks to the session through a [`SessionHandle`],
//! which forwards commands over an mpsc channel. The actor applies them one
//! at a time, so the roster, board, and turn are never touched
//! concurrently, and then fans the resulting events out to every
//! registered connection.

use std::collections::HashMap;

use tictac_protocol::{ConnectionId, MoveEvent, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::{GameSession, SessionError, SessionState};

/// Channel sender for delivering broadcast events to one connection.
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to the session actor.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the others are
/// fire-and-forget.
enum SessionCommand {
    /// Register a connection's outbound channel and add it to the roster.
    Connect {
        id: ConnectionId,
        sender: ConnectionSender,
        reply: oneshot::Sender<()>,
    },

    /// Remove a connection from the roster.
    Disconnect { id: ConnectionId },

    /// Deliver a move or resignation.
    Move { id: ConnectionId, event: MoveEvent },

    /// Request a snapshot of the session.
    Info { reply: oneshot::Sender<SessionInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of session metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Current lifecycle state.
    pub state: SessionState,
    /// Connections holding a player slot (0, 1 or 2).
    pub player_count: usize,
    /// Connections beyond the two player slots.
    pub spectator_count: usize,
}

/// Handle to the running session actor.
///
/// Cheap to clone; every connection task holds one.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Adds a connection to the roster.
    ///
    /// `sender` receives every event broadcast from now on, including the
    /// `MatchStarted` this connect may trigger. Resolves once the actor
    /// has processed the join.
    pub async fn connect(
        &self,
        id: ConnectionId,
        sender: ConnectionSender,
    ) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Connect {
            id,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Removes a connection from the roster (fire-and-forget).
    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), SessionError> {
        self.send(SessionCommand::Disconnect { id }).await
    }

    /// Submits a move or resignation (fire-and-forget).
    pub async fn submit_move(
        &self,
        id: ConnectionId,
        event: MoveEvent,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::Move { id, event }).await
    }

    /// Requests a snapshot of the session.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SessionError::Unavailable)
    }
}

/// The actor state. Runs inside a Tokio task.
struct SessionActor {
    session: GameSession,
    /// Outbound channel per connected client, spectators included.
    senders: HashMap<ConnectionId, ConnectionSender>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    /// Processes commands until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("game session started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Connect { id, sender, reply } => {
                    // Register first so the newcomer sees MatchStarted.
                    self.senders.insert(id.clone(), sender);
                    let events = self.session.connect(id);
                    self.broadcast(events);
                    let _ = reply.send(());
                }
                SessionCommand::Disconnect { id } => {
                    // Unregister first; the leaver gets nothing further.
                    self.senders.remove(&id);
                    let events = self.session.disconnect(&id);
                    self.broadcast(events);
                }
                SessionCommand::Move { id, event } => {
                    let events = self.session.handle_move(&id, event);
                    self.broadcast(events);
                }
                SessionCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Shutdown => {
                    tracing::info!("game session shutting down");
                    break;
                }
            }
        }

        tracing::info!("game session stopped");
    }

    /// Sends each event, in order, to every registered connection.
    /// Receivers that are gone are skipped silently.
    fn broadcast(&self, events: Vec<ServerEvent>) {
        for event in events {
            tracing::debug!(
                event = event.name(),
                recipients = self.senders.len(),
                "broadcasting"
            );
            for sender in self.senders.values() {
                let _ = sender.send(event.clone());
            }
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            state: self.session.state(),
            player_count: self.session.players().len(),
            spectator_count: self.session.spectators().len(),
        }
    }
}

/// Spawns the session actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub fn spawn_session(channel_size: usize) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = SessionActor {
        session: GameSession::new(),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle { sender: tx }
}
