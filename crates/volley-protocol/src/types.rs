//! Message and summary types as they appear on the wire.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use volley_physics::{Ball, Direction, Score, Slot};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifies one match for its whole life. Serialized as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

/// A frame sent by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Must be the first frame on a connection.
    Join {
        identity: String,
        /// Session the player was in before losing its connection.
        #[serde(default)]
        resume_session_id: Option<SessionId>,
    },
    Move { direction: Direction },
}

impl ClientMessage {
    /// Checks rules the type system cannot express.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ClientMessage::Join { identity, .. } if identity.trim().is_empty() => Err(
                ProtocolError::InvalidMessage("join requires a non-empty identity".into()),
            ),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

/// Positions of everything on the court.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub ball: Ball,
    /// Paddle centres, slot one first.
    pub paddles: [f64; 2],
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    /// A slot reached the win score.
    Score,
    /// A disconnected player did not come back within the grace period.
    Timeout,
    /// Both players dropped.
    Abandoned,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndReason::Score => "score",
            EndReason::Timeout => "timeout",
            EndReason::Abandoned => "abandoned",
        })
    }
}

/// HTTP-style codes carried by [`ServerMessage::Error`].
pub mod error_code {
    /// The frame could not be decoded, or `join` was missing or invalid.
    pub const MALFORMED: u16 = 400;
    /// The matchmaker refused the join.
    pub const REJECTED: u16 = 409;
}

/// A frame sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Tells a freshly attached connection where it sits.
    PlayerAssignment {
        session_id: SessionId,
        slot: Slot,
        board: Board,
        score: Score,
    },
    /// The opponent has taken the other slot; the match is live.
    PlayerJoined { slot: Slot, identity: String },
    GameUpdate { board: Board, score: Score },
    ScoreUpdate { score: Score, scorer: Slot },
    /// The opponent dropped; the match is paused for `grace_ms`.
    PlayerDisconnected {
        slot: Slot,
        identity: String,
        grace_ms: u64,
    },
    /// Full snapshot after a player came back.
    Reconnection {
        session_id: SessionId,
        slot: Slot,
        board: Board,
        score: Score,
    },
    GameEnded {
        reason: EndReason,
        winner: Slot,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner_identity: Option<String>,
        score: Score,
    },
    Error { code: u16, message: String },
}

impl ServerMessage {
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Casual,
    Ranked,
}

/// What the history service is told about a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub session_id: SessionId,
    /// Identities by slot, slot one first.
    pub players: [String; 2],
    pub score: Score,
    pub created_at: DateTime<Utc>,
    pub match_type: MatchType,
    pub reason: EndReason,
    pub winner: Slot,
}

impl MatchSummary {
    pub fn winner_identity(&self) -> &str {
        &self.players[self.winner.index()]
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn board() -> Board {
        Board {
            ball: Ball {
                x: 400.0,
                y: 300.0,
                vx: 4.0,
                vy: -4.0,
            },
            paddles: [300.0, 250.0],
        }
    }

    // =====================================================================
    // SessionId
    // =====================================================================

    #[test]
    fn test_session_id_is_a_plain_number() {
        assert_eq!(serde_json::to_string(&SessionId(7)).unwrap(), "7");
        assert_eq!(SessionId(7).to_string(), "S-7");
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_join_with_resume_id_parses() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "join",
            "identity": "alice",
            "resumeSessionId": 7
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                identity: "alice".into(),
                resume_session_id: Some(SessionId(7)),
            }
        );
    }

    #[test]
    fn test_join_without_resume_id_defaults_to_none() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "join", "identity": "bob"})).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Join {
                resume_session_id: None,
                ..
            }
        ));

        let msg: ClientMessage = serde_json::from_value(
            json!({"type": "join", "identity": "bob", "resumeSessionId": null}),
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Join {
                resume_session_id: None,
                ..
            }
        ));
    }

    #[test]
    fn test_move_parses_direction() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "move", "direction": "down"})).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Move {
                direction: Direction::Down
            }
        );
    }

    #[test]
    fn test_move_with_bad_direction_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_value(json!({"type": "move", "direction": "left"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_blank_identity_is_invalid() {
        let msg = ClientMessage::Join {
            identity: "   ".into(),
            resume_session_id: None,
        };
        assert!(matches!(
            msg.validate(),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_validate_move_is_always_ok() {
        let msg = ClientMessage::Move {
            direction: Direction::Up,
        };
        assert!(msg.validate().is_ok());
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_player_assignment_json_shape() {
        let msg = ServerMessage::PlayerAssignment {
            session_id: SessionId(3),
            slot: Slot::Two,
            board: board(),
            score: Score::new(0, 0),
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "playerAssignment");
        assert_eq!(v["sessionId"], 3);
        assert_eq!(v["slot"], 2);
        assert_eq!(v["board"]["ball"]["vy"], -4.0);
        assert_eq!(v["board"]["paddles"][1], 250.0);
        assert_eq!(v["score"]["slot1"], 0);
    }

    #[test]
    fn test_player_disconnected_uses_camel_case_fields() {
        let msg = ServerMessage::PlayerDisconnected {
            slot: Slot::One,
            identity: "alice".into(),
            grace_ms: 5_000,
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "playerDisconnected");
        assert_eq!(v["graceMs"], 5_000);
    }

    #[test]
    fn test_game_ended_json_shape() {
        let msg = ServerMessage::GameEnded {
            reason: EndReason::Timeout,
            winner: Slot::Two,
            winner_identity: Some("bob".into()),
            score: Score::new(0, 5),
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            v,
            json!({
                "type": "gameEnded",
                "reason": "timeout",
                "winner": 2,
                "winnerIdentity": "bob",
                "score": {"slot1": 0, "slot2": 5}
            })
        );
    }

    #[test]
    fn test_error_message_json_shape() {
        let v = serde_json::to_value(ServerMessage::error(error_code::REJECTED, "full"))
            .unwrap();
        assert_eq!(v, json!({"type": "error", "code": 409, "message": "full"}));
    }

    // =====================================================================
    // MatchSummary
    // =====================================================================

    #[test]
    fn test_match_summary_json_shape() {
        let summary = MatchSummary {
            session_id: SessionId(9),
            players: ["alice".into(), "bob".into()],
            score: Score::new(5, 4),
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            match_type: MatchType::Casual,
            reason: EndReason::Score,
            winner: Slot::One,
        };
        let v = serde_json::to_value(&summary).unwrap();
        assert_eq!(v["sessionId"], 9);
        assert_eq!(v["players"], json!(["alice", "bob"]));
        assert_eq!(v["createdAt"], "2026-01-02T03:04:05Z");
        assert_eq!(v["matchType"], "casual");
        assert_eq!(v["reason"], "score");
        assert_eq!(v["winner"], 1);
        assert_eq!(summary.winner_identity(), "alice");
    }
}
