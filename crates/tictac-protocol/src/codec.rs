//! Codec trait and the JSON implementation.
//!
//! The server never touches `serde_json` directly; it asks a [`Codec`] to
//! turn events into frames and frames into events, so the wire format can
//! be swapped without touching the session or the connection handler.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to frame bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use tictac_protocol::{ClientEvent, Codec, JsonCodec, MoveEvent};
///
/// let codec = JsonCodec;
/// let event: ClientEvent = codec
///     .decode(br#"{"event":"Move","data":{"position":5}}"#)
///     .unwrap();
/// assert_eq!(event, ClientEvent::Move(MoveEvent::at(5)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, MatchEnded, ServerEvent};

    #[test]
    fn test_json_codec_encodes_server_event() {
        let codec = JsonCodec;
        let bytes = codec
            .encode(&ServerEvent::MatchEnded(MatchEnded {
                text: "Game is tied.".into(),
            }))
            .unwrap();
        let decoded: ServerEvent = codec.decode(&bytes).unwrap();
        assert_eq!(
            decoded,
            ServerEvent::MatchEnded(MatchEnded {
                text: "Game is tied.".into()
            })
        );
    }

    #[test]
    fn test_json_codec_decode_garbage_is_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
