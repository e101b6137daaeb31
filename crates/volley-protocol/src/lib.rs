//! Wire protocol for Volley.
//!
//! Every frame is one JSON object tagged by its `type` field. Clients send
//! [`ClientMessage`]s, the server answers with [`ServerMessage`]s, and a
//! finished match is described to the history service by a
//! [`MatchSummary`].
//!
//! ```text
//! Transport (bytes) -> Codec -> ClientMessage -> session engine
//! session engine -> ServerMessage -> Codec -> Transport (bytes)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Board, ClientMessage, EndReason, MatchSummary, MatchType, ServerMessage, SessionId,
    error_code,
};

// The court model is part of the wire format.
pub use volley_physics::{Ball, Direction, Score, Slot};
