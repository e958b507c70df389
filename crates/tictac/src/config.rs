//! Server configuration.

use std::time::Duration;

use tictac_transport::DEFAULT_HANDSHAKE_TIMEOUT;

/// Settings for a [`GameServer`](crate::GameServer).
///
/// Usually filled in through [`GameServerBuilder`](crate::GameServerBuilder);
/// the binary maps its command-line flags onto this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to. Port `0` picks a free port.
    pub bind_addr: String,

    /// Capacity of the session actor's command queue.
    pub command_buffer: usize,

    /// How long a new peer gets to complete the WebSocket upgrade.
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            command_buffer: 64,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}
