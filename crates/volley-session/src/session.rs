//! Per-match state held by the registry.

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::debug;
use volley_physics::{Ball, PhysicsConfig, Score, Slot};
use volley_protocol::{Board, MatchType, ServerMessage, SessionId};
use volley_transport::ConnectionId;

/// Outbound queue of one client connection, drained by its writer task.
pub type ClientSender = mpsc::UnboundedSender<ServerMessage>;

// ---------------------------------------------------------------------------
// ConnectionHandle
// ---------------------------------------------------------------------------

/// The registry's view of a live socket: its id and outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: ClientSender,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: ClientSender) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// False once the writer task has gone away.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues `msg`. Returns false if the connection is gone.
    pub fn send(&self, msg: ServerMessage) -> bool {
        match self.sender.send(msg) {
            Ok(()) => true,
            Err(_) => {
                debug!(conn = %self.id, "outbound queue closed, dropping message");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle of a match.
///
/// ```text
/// Waiting ──(second player)──> Active <──(reconnect)──> Paused
///                                 │                        │
///                                 └──────> Finished <──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// One player seated, waiting for an opponent.
    Waiting,
    Active,
    /// A slot has lost its connection.
    Paused,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Finished => "finished",
        })
    }
}

// ---------------------------------------------------------------------------
// PlayerSlot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlayerSlot {
    pub identity: String,
    pub paddle_y: f64,
    /// `None` once the player's disconnect has been processed.
    pub connection: Option<ConnectionHandle>,
}

impl PlayerSlot {
    pub fn is_live(&self) -> bool {
        self.connection.as_ref().is_some_and(ConnectionHandle::is_open)
    }

    pub fn holds(&self, conn: ConnectionId) -> bool {
        self.connection.as_ref().is_some_and(|c| c.id() == conn)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One match and its authoritative state.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub slots: [Option<PlayerSlot>; 2],
    pub ball: Ball,
    pub score: Score,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub match_type: MatchType,
    /// Physics steps taken so far.
    pub ticks: u64,
    /// Where an empty slot's paddle is drawn.
    paddle_start_y: f64,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        identity: String,
        connection: ConnectionHandle,
        ball: Ball,
        physics: &PhysicsConfig,
        match_type: MatchType,
    ) -> Self {
        Self {
            id,
            slots: [
                Some(PlayerSlot {
                    identity,
                    paddle_y: physics.paddle_start_y(),
                    connection: Some(connection),
                }),
                None,
            ],
            ball,
            score: Score::default(),
            status: SessionStatus::Waiting,
            created_at: Utc::now(),
            match_type,
            ticks: 0,
            paddle_start_y: physics.paddle_start_y(),
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<&PlayerSlot> {
        self.slots[slot.index()].as_ref()
    }

    pub fn slot_mut(&mut self, slot: Slot) -> Option<&mut PlayerSlot> {
        self.slots[slot.index()].as_mut()
    }

    /// The slot held by `identity`, connected or not.
    pub fn slot_of(&self, identity: &str) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|s| self.slot(*s).is_some_and(|p| p.identity == identity))
    }

    /// The slot whose current connection is `conn`.
    pub fn slot_for_connection(&self, conn: ConnectionId) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|s| self.slot(*s).is_some_and(|p| p.holds(conn)))
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_live(&self, slot: Slot) -> bool {
        self.slot(slot).is_some_and(PlayerSlot::is_live)
    }

    pub fn both_live(&self) -> bool {
        Slot::ALL.into_iter().all(|s| self.is_live(s))
    }

    pub fn any_live(&self) -> bool {
        Slot::ALL.into_iter().any(|s| self.is_live(s))
    }

    pub fn identity(&self, slot: Slot) -> &str {
        self.slot(slot).map(|p| p.identity.as_str()).unwrap_or_default()
    }

    pub fn paddles(&self) -> [f64; 2] {
        let y = |s: Slot| self.slot(s).map_or(self.paddle_start_y, |p| p.paddle_y);
        [y(Slot::One), y(Slot::Two)]
    }

    pub fn board(&self) -> Board {
        Board {
            ball: self.ball,
            paddles: self.paddles(),
        }
    }

    /// Queues `msg` to `slot`'s connection, if it has one.
    pub(crate) fn send_to(&self, slot: Slot, msg: ServerMessage) {
        if let Some(conn) = self.slot(slot).and_then(|p| p.connection.as_ref()) {
            conn.send(msg);
        }
    }

    /// Queues `msg` to every connected slot.
    pub(crate) fn broadcast(&self, msg: ServerMessage) {
        for slot in Slot::ALL {
            self.send_to(slot, msg.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// DisconnectRecord
// ---------------------------------------------------------------------------

/// Token naming one armed grace timer.
///
/// Expiry notifications carry the token; one that no longer matches the
/// session's record belongs to a timer that was already cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// An outstanding grace period for a dropped player.
#[derive(Debug, Clone)]
pub struct DisconnectRecord {
    pub session_id: SessionId,
    pub identity: String,
    pub slot: Slot,
    pub timer: TimerId,
    pub disconnected_at: DateTime<Utc>,
}
