//! Protocol-layer errors.

/// Failures turning messages into bytes and back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not valid JSON or does not match any known message.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but breaks a protocol rule, such as a `join`
    /// with a blank identity.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
