//! Unified error type for the Volley server.

use volley_protocol::ProtocolError;
use volley_report::ReportError;
use volley_session::SessionError;
use volley_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum VolleyError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The matchmaker refused a join.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The history sink could not be set up.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The engine task has stopped.
    #[error("session engine unavailable")]
    EngineUnavailable,
}
