//! Unified error type for the tictac server.

use tictac_protocol::ProtocolError;
use tictac_session::SessionError;
use tictac_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// `#[from]` on each variant lets `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TictacError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game session is gone.
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::BindFailed(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "port taken",
        ));
        let tictac_err: TictacError = err.into();
        assert!(matches!(tictac_err, TictacError::Transport(_)));
        assert!(tictac_err.to_string().contains("port taken"));
    }

    #[test]
    fn test_from_protocol_error() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let tictac_err: TictacError = ProtocolError::Decode(json_err).into();
        assert!(matches!(tictac_err, TictacError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let tictac_err: TictacError = SessionError::Unavailable.into();
        assert!(matches!(tictac_err, TictacError::Session(_)));
        assert_eq!(tictac_err.to_string(), "game session is unavailable");
    }
}
