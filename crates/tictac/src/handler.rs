//! Per-connection handler: greeting, session registration, and relaying.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Join the game session (roster + broadcast registration)
//!   2. Send `Welcome` with the connection's id
//!   3. Loop: decode inbound frames into session commands, and encode
//!      broadcast events onto the socket, until the socket closes

use std::sync::Arc;

use tictac_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent, Welcome};
use tictac_session::SessionHandle;
use tictac_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::TictacError;

/// Drop guard that removes the connection from the session when the
/// handler exits, however it exits.
///
/// `Drop` is synchronous, so the disconnect is sent from a spawned task.
struct ConnectionGuard {
    id: ConnectionId,
    session: SessionHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let id = self.id.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            if let Err(e) = session.disconnect(id.clone()).await {
                tracing::debug!(%id, error = %e, "disconnect not delivered");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TictacError> {
    let id = conn.id().clone();
    tracing::debug!(%id, "handling new connection");

    // Join before greeting: once a client reads `Welcome` it is already in
    // the roster. Broadcasts that arrive meanwhile wait in `outbound`.
    let (tx, mut outbound) = mpsc::unbounded_channel();
    state.session.connect(id.clone(), tx).await?;
    let _guard = ConnectionGuard {
        id: id.clone(),
        session: state.session.clone(),
    };

    let welcome = ServerEvent::Welcome(Welcome {
        connection_id: id.clone(),
    });
    conn.send(&state.codec.encode(&welcome)?).await?;

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => handle_frame(&state, &id, &data).await?,
                Ok(None) => {
                    tracing::info!(%id, "connection closed");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%id, error = %e, "recv error");
                    break;
                }
            },
            Some(event) = outbound.recv() => {
                let bytes = state.codec.encode(&event)?;
                conn.send(&bytes).await?;
            }
        }
    }

    // _guard drops here → session disconnect fires.
    Ok(())
}

/// Decodes one inbound frame and forwards it to the session.
///
/// Undecodable frames are dropped; clients never receive error events.
async fn handle_frame<C: Codec>(
    state: &ServerState<C>,
    id: &ConnectionId,
    data: &[u8],
) -> Result<(), TictacError> {
    let event: ClientEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%id, error = %e, "failed to decode frame, ignoring");
            return Ok(());
        }
    };

    match event {
        ClientEvent::Move(mv) => {
            state.session.submit_move(id.clone(), mv).await?;
        }
    }
    Ok(())
}
