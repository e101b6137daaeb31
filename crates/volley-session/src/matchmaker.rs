//! Pairing players into sessions.

use tracing::{debug, info};
use volley_physics::{Slot, serve};
use volley_protocol::{ServerMessage, SessionId};

use crate::{
    ConnectionHandle, Effect, PlayerSlot, Session, SessionError, SessionRegistry, SessionStatus,
};

/// Where a join request landed.
#[derive(Debug)]
pub struct Joined {
    pub session_id: SessionId,
    pub slot: Slot,
    /// True when the player took back a slot it already held.
    pub reconnected: bool,
    pub effects: Vec<Effect>,
}

impl SessionRegistry {
    /// Seats `identity` on `conn`.
    ///
    /// In order of preference: the slot named by `resume`, the slot of an
    /// outstanding disconnect record for `identity`, the open slot of the
    /// waiting session, or slot one of a brand new session. A `resume`
    /// naming an unknown session is ignored.
    pub fn join(
        &mut self,
        conn: ConnectionHandle,
        identity: &str,
        resume: Option<SessionId>,
    ) -> Result<Joined, SessionError> {
        if let Some(session_id) = resume {
            match self.sessions.get(&session_id) {
                Some(session) => match session.slot_of(identity) {
                    Some(slot) if session.is_live(slot) => {
                        return Err(SessionError::AlreadySeated {
                            identity: identity.to_owned(),
                            session_id,
                        });
                    }
                    Some(slot) => return Ok(self.reattach(session_id, slot, identity, conn)),
                    None if session.is_full() => {
                        return Err(SessionError::SessionFull(session_id));
                    }
                    None => {}
                },
                None => debug!(%session_id, %identity, "resume names unknown session"),
            }
        }

        let pending = self
            .records
            .values()
            .find(|r| r.identity == identity)
            .map(|r| (r.session_id, r.slot));
        if let Some((session_id, slot)) = pending {
            return Ok(self.reattach(session_id, slot, identity, conn));
        }

        if let Some(session_id) = self.waiting {
            if let Some(session) = self.sessions.get(&session_id) {
                match session.slot_of(identity) {
                    Some(slot) if session.is_live(slot) => {
                        return Err(SessionError::AlreadySeated {
                            identity: identity.to_owned(),
                            session_id,
                        });
                    }
                    Some(slot) => return Ok(self.reattach(session_id, slot, identity, conn)),
                    None => return Ok(self.seat_opponent(session_id, identity, conn)),
                }
            }
        }

        Ok(self.open_session(identity, conn))
    }

    /// Puts `conn` back into `slot`, cancelling the slot's grace timer.
    fn reattach(
        &mut self,
        session_id: SessionId,
        slot: Slot,
        identity: &str,
        conn: ConnectionHandle,
    ) -> Joined {
        let mut effects = Vec::new();
        if self.records.get(&session_id).is_some_and(|r| r.slot == slot) {
            if let Some(record) = self.records.remove(&session_id) {
                effects.push(Effect::CancelGrace(record.timer));
            }
        }

        let Some(session) = self.sessions.get_mut(&session_id) else {
            return self.open_session(identity, conn);
        };
        if let Some(player) = session.slot_mut(slot) {
            player.connection = Some(conn);
        }

        if session.status == SessionStatus::Waiting {
            session.send_to(
                slot,
                ServerMessage::PlayerAssignment {
                    session_id,
                    slot,
                    board: session.board(),
                    score: session.score,
                },
            );
        } else {
            if session.status == SessionStatus::Paused && session.both_live() {
                session.status = SessionStatus::Active;
            }
            session.broadcast(ServerMessage::Reconnection {
                session_id,
                slot,
                board: session.board(),
                score: session.score,
            });
        }

        info!(%session_id, %slot, %identity, status = %session.status, "player reconnected");
        Joined {
            session_id,
            slot,
            reconnected: true,
            effects,
        }
    }

    /// Fills the waiting session's empty slot and starts the match.
    fn seat_opponent(
        &mut self,
        session_id: SessionId,
        identity: &str,
        conn: ConnectionHandle,
    ) -> Joined {
        let start_y = self.config.physics.paddle_start_y();
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return self.open_session(identity, conn);
        };
        let Some(slot) = Slot::ALL.into_iter().find(|s| session.slot(*s).is_none()) else {
            return self.open_session(identity, conn);
        };

        session.slots[slot.index()] = Some(PlayerSlot {
            identity: identity.to_owned(),
            paddle_y: start_y,
            connection: Some(conn),
        });
        session.status = SessionStatus::Active;
        self.waiting = None;

        session.send_to(
            slot,
            ServerMessage::PlayerAssignment {
                session_id,
                slot,
                board: session.board(),
                score: session.score,
            },
        );
        session.send_to(
            slot.other(),
            ServerMessage::PlayerJoined {
                slot,
                identity: identity.to_owned(),
            },
        );
        session.broadcast(ServerMessage::GameUpdate {
            board: session.board(),
            score: session.score,
        });

        info!(
            %session_id,
            slot1 = %session.identity(Slot::One),
            slot2 = %session.identity(Slot::Two),
            "session active"
        );
        Joined {
            session_id,
            slot,
            reconnected: false,
            effects: vec![Effect::StartLoop(session_id)],
        }
    }

    /// Creates a waiting session with `identity` in slot one.
    fn open_session(&mut self, identity: &str, conn: ConnectionHandle) -> Joined {
        let session_id = self.allocate_session_id();
        let ball = serve(&self.config.physics, &mut self.rng);
        let session = Session::new(
            session_id,
            identity.to_owned(),
            conn,
            ball,
            &self.config.physics,
            self.config.match_type,
        );
        session.send_to(
            Slot::One,
            ServerMessage::PlayerAssignment {
                session_id,
                slot: Slot::One,
                board: session.board(),
                score: session.score,
            },
        );
        self.sessions.insert(session_id, session);
        self.waiting = Some(session_id);

        info!(%session_id, %identity, "session created, waiting for opponent");
        Joined {
            session_id,
            slot: Slot::One,
            reconnected: false,
            effects: Vec::new(),
        }
    }
}
