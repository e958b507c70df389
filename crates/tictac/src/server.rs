//! `GameServer` builder and accept loop.
//!
//! This is the composition root: it binds the transport, spawns the one
//! game session, and hands every accepted connection a handle to it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tictac_protocol::{Codec, JsonCodec};
use tictac_session::{SessionHandle, spawn_session};
use tictac_transport::{Handshake, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ServerConfig, TictacError};

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) session: SessionHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a [`GameServer`].
///
/// # Example
///
/// ```rust,no_run
/// use tictac::GameServerBuilder;
///
/// # async fn run() -> Result<(), tictac::TictacError> {
/// let server = GameServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameServerBuilder {
    config: ServerConfig,
}

impl GameServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn with_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the capacity of the session command queue.
    pub fn command_buffer(mut self, size: usize) -> Self {
        self.config.command_buffer = size;
        self
    }

    /// Sets how long a new peer gets to finish the WebSocket upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Binds the listener, then spawns the game session.
    ///
    /// The session is only created once the transport is ready; a bind
    /// failure is returned here and nothing is left running.
    pub async fn build(self) -> Result<GameServer<JsonCodec>, TictacError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr)
            .await?
            .with_handshake_timeout(self.config.handshake_timeout);
        let session = spawn_session(self.config.command_buffer.max(1));

        let state = Arc::new(ServerState {
            session,
            codec: JsonCodec,
        });

        Ok(GameServer { transport, state })
    }
}

/// A bound tictac server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GameServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> GameServer<C> {
    /// Creates a new builder.
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TictacError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the game session.
    pub fn session(&self) -> SessionHandle {
        self.state.session.clone()
    }

    /// Runs the accept loop.
    ///
    /// Each accepted peer gets its own task, which runs the WebSocket
    /// upgrade and then the connection handler, so a peer that stalls
    /// mid-handshake never delays the next one. Accept failures are logged
    /// and the loop keeps going; it runs until the process exits.
    pub async fn run(mut self) -> Result<(), TictacError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "tictac server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match pending.complete().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "handshake failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
