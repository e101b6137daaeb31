//! Disconnects, grace periods and the end of a match.
//!
//! ```text
//! Active ──(one drops)──> Paused + record ──(back in time)──> Active
//!                              │
//!                              ├──(grace expires)──> Finished (timeout)
//!                              └──(other drops)────> Finished (abandoned)
//! ```
//!
//! Forfeits are scored as a walkover: the winner gets the win score and
//! the loser zero, whatever the board said.

use chrono::Utc;
use tracing::{debug, info};
use volley_physics::{Score, Slot};
use volley_protocol::{EndReason, MatchSummary, ServerMessage, SessionId};
use volley_transport::ConnectionId;

use crate::{DisconnectRecord, Effect, SessionRegistry, SessionStatus, TimerId};

impl SessionRegistry {
    /// Handles the loss of `conn`.
    ///
    /// Connections that no longer hold a slot in the session are ignored.
    pub fn disconnect(&mut self, session_id: SessionId, conn: ConnectionId) -> Vec<Effect> {
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return Vec::new();
        };
        let Some(slot) = session.slot_for_connection(conn) else {
            debug!(%session_id, %conn, "disconnect from unseated connection ignored");
            return Vec::new();
        };
        if let Some(player) = session.slot_mut(slot) {
            player.connection = None;
        }
        let identity = session.identity(slot).to_owned();

        match session.status {
            SessionStatus::Waiting => {
                self.sessions.remove(&session_id);
                if self.waiting == Some(session_id) {
                    self.waiting = None;
                }
                info!(%session_id, %identity, "waiting player left, session removed");
                Vec::new()
            }
            SessionStatus::Finished => Vec::new(),
            SessionStatus::Active | SessionStatus::Paused => {
                if let Some(first) = self.records.get(&session_id) {
                    // The winner is whoever was not the first to drop.
                    let winner = Slot::ALL
                        .into_iter()
                        .find(|s| session.identity(*s) != first.identity)
                        .unwrap_or(slot);
                    info!(
                        %session_id,
                        first = %first.identity,
                        second = %identity,
                        "both players gone, finalizing"
                    );
                    let score = Score::walkover(winner, self.config.physics.win_score);
                    return self.finalize(session_id, EndReason::Abandoned, winner, score);
                }

                session.status = SessionStatus::Paused;
                let grace = self.config.grace_period;
                session.send_to(
                    slot.other(),
                    ServerMessage::PlayerDisconnected {
                        slot,
                        identity: identity.clone(),
                        grace_ms: u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                    },
                );

                let timer = self.allocate_timer_id();
                info!(%session_id, %slot, %identity, %timer, "player dropped, grace period started");
                self.records.insert(
                    session_id,
                    DisconnectRecord {
                        session_id,
                        identity,
                        slot,
                        timer,
                        disconnected_at: Utc::now(),
                    },
                );
                vec![Effect::ArmGrace {
                    session_id,
                    timer,
                    after: grace,
                }]
            }
        }
    }

    /// Handles a grace timer firing. Stale timers are ignored.
    pub fn grace_expired(&mut self, session_id: SessionId, timer: TimerId) -> Vec<Effect> {
        if self.records.get(&session_id).map(|r| r.timer) != Some(timer) {
            debug!(%session_id, %timer, "stale grace timer ignored");
            return Vec::new();
        }
        let Some(record) = self.records.remove(&session_id) else {
            return Vec::new();
        };

        let winner = record.slot.other();
        info!(%session_id, identity = %record.identity, "grace period expired");
        let score = Score::walkover(winner, self.config.physics.win_score);
        self.finalize(session_id, EndReason::Timeout, winner, score)
    }

    /// Ends a match: notifies whoever is still connected, drops the session
    /// and its record, and asks for the loop to stop and the result to be
    /// reported.
    pub(crate) fn finalize(
        &mut self,
        session_id: SessionId,
        reason: EndReason,
        winner: Slot,
        score: Score,
    ) -> Vec<Effect> {
        let Some(mut session) = self.sessions.remove(&session_id) else {
            return Vec::new();
        };
        session.status = SessionStatus::Finished;
        session.score = score;

        let mut effects = vec![Effect::StopLoop(session_id)];
        if let Some(record) = self.records.remove(&session_id) {
            effects.push(Effect::CancelGrace(record.timer));
        }
        if self.waiting == Some(session_id) {
            self.waiting = None;
        }

        let winner_identity = session.identity(winner).to_owned();
        session.broadcast(ServerMessage::GameEnded {
            reason,
            winner,
            winner_identity: Some(winner_identity.clone()),
            score,
        });

        info!(%session_id, %reason, %winner, %winner_identity, %score, "match finished");
        effects.push(Effect::Report(MatchSummary {
            session_id,
            players: [
                session.identity(Slot::One).to_owned(),
                session.identity(Slot::Two).to_owned(),
            ],
            score,
            created_at: session.created_at,
            match_type: session.match_type,
            reason,
            winner,
        }));
        effects
    }
}
