//! Matchmaking rejections.

use volley_protocol::SessionId;

/// Why a join request was refused.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Both slots of the requested session belong to other players.
    #[error("session {0} is full")]
    SessionFull(SessionId),

    /// The identity already holds a live connection in the session.
    #[error("{identity} is already seated in session {session_id}")]
    AlreadySeated {
        identity: String,
        session_id: SessionId,
    },
}
