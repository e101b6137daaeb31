//! Byte encoding for protocol messages.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns messages into frame payloads and back.
///
/// The connection handler is generic over this so the wire format can be
/// swapped without touching the session engine.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// JSON via `serde_json`. Enabled by the default `json` feature.
///
/// ```rust
/// use volley_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let msg: ClientMessage = JsonCodec
///     .decode(br#"{"type":"move","direction":"up"}"#)
///     .unwrap();
/// assert!(matches!(msg, ClientMessage::Move { .. }));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
