//! WebSocket transport on top of `tokio-tungstenite`.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{Connection, ConnectionId, Handshake, Transport, TransportError};

/// How long a peer gets to finish the WebSocket upgrade.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

/// Sequence for connection ids, shared by every listener in the process.
static CONNECTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// Wraps a tungstenite error so it fits the io-based [`TransportError`].
fn ws_error(kind: io::ErrorKind, err: tungstenite::Error) -> io::Error {
    io::Error::new(kind, err)
}

/// Listens for TCP connections and upgrades each to a WebSocket.
pub struct WebSocketTransport {
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl WebSocketTransport {
    /// Binds to `addr`. Port `0` picks a free port; see
    /// [`Transport::local_addr`].
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        })
    }

    /// Sets how long each peer gets to complete the upgrade.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

impl Transport for WebSocketTransport {
    type Incoming = PendingWebSocket;
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<PendingWebSocket, TransportError> {
        let (tcp, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::trace!(%peer, "TCP peer accepted");
        Ok(PendingWebSocket {
            tcp,
            peer,
            timeout: self.handshake_timeout,
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(TransportError::BindFailed)
    }
}

/// A TCP peer still waiting for its WebSocket upgrade.
#[derive(Debug)]
pub struct PendingWebSocket {
    tcp: TcpStream,
    peer: SocketAddr,
    timeout: Duration,
}

impl PendingWebSocket {
    /// The remote address of the peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn complete(self) -> Result<WebSocketConnection, TransportError> {
        let Self { tcp, peer, timeout } = self;
        let upgrade = tokio_tungstenite::accept_async(tcp);
        let ws = match tokio::time::timeout(timeout, upgrade).await {
            Ok(Ok(ws)) => ws,
            Ok(Err(e)) => {
                tracing::debug!(%peer, error = %e, "WebSocket upgrade failed");
                return Err(TransportError::AcceptFailed(ws_error(
                    io::ErrorKind::ConnectionRefused,
                    e,
                )));
            }
            Err(_) => {
                tracing::debug!(%peer, ?timeout, "WebSocket upgrade timed out");
                return Err(TransportError::AcceptFailed(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "WebSocket handshake timed out",
                )));
            }
        };

        let id =
            ConnectionId::from_sequence(CONNECTION_SEQUENCE.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted WebSocket connection");
        Ok(WebSocketConnection::new(id, ws))
    }
}

/// One upgraded WebSocket.
///
/// The two halves are locked separately: a task parked in `recv` never
/// delays a broadcast going out through `send`.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<WsSink>,
    source: Mutex<WsSource>,
}

impl WebSocketConnection {
    fn new(id: ConnectionId, ws: WebSocketStream<TcpStream>) -> Self {
        let (sink, source) = ws.split();
        Self {
            id,
            sink: Mutex::new(sink),
            source: Mutex::new(source),
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        // UTF-8 payloads go out as text frames so browsers get strings.
        let frame = match std::str::from_utf8(data) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::binary(data.to_vec()),
        };
        let mut sink = self.sink.lock().await;
        sink.send(frame)
            .await
            .map_err(|e| TransportError::SendFailed(ws_error(io::ErrorKind::BrokenPipe, e)))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut source = self.source.lock().await;
        while let Some(frame) = source.next().await {
            let frame = frame.map_err(|e| {
                TransportError::ReceiveFailed(ws_error(io::ErrorKind::ConnectionReset, e))
            })?;
            match frame {
                Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
                Message::Binary(data) => return Ok(Some(data.into())),
                Message::Close(_) => return Ok(None),
                // Ping/pong are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;
        sink.close()
            .await
            .map_err(|e| TransportError::SendFailed(ws_error(io::ErrorKind::BrokenPipe, e)))
    }

    fn id(&self) -> &ConnectionId {
        &self.id
    }
}
