//! The session registry: sole owner of every live match.
//!
//! All mutation happens through `&mut self`, so the registry is meant to
//! live inside one task that feeds it commands in order. Operations that
//! need timers, loops or network calls return [`Effect`]s instead of
//! performing them.
//!
//! Matchmaking lives in `matchmaker.rs` and the disconnect state machine
//! in `supervisor.rs`; both are further `impl` blocks on this type.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, trace};
use volley_physics::{Direction, advance, move_paddle};
use volley_protocol::{EndReason, ServerMessage, SessionId};
use volley_transport::ConnectionId;

use crate::{DisconnectRecord, Effect, Session, SessionConfig, SessionStatus, TimerId};

pub struct SessionRegistry {
    pub(crate) config: SessionConfig,
    pub(crate) sessions: HashMap<SessionId, Session>,
    /// At most one per session.
    pub(crate) records: HashMap<SessionId, DisconnectRecord>,
    /// The session new players are paired into, if one is open.
    pub(crate) waiting: Option<SessionId>,
    pub(crate) rng: StdRng,
    next_session_id: u64,
    next_timer_id: u64,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Uses `rng` for serves and bounce jitter. Seed it to replay matches.
    pub fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            records: HashMap::new(),
            waiting: None,
            rng,
            next_session_id: 1,
            next_timer_id: 1,
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn record(&self, id: SessionId) -> Option<&DisconnectRecord> {
        self.records.get(&id)
    }

    pub fn waiting_session(&self) -> Option<SessionId> {
        self.waiting
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn allocate_session_id(&mut self) -> SessionId {
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        id
    }

    pub(crate) fn allocate_timer_id(&mut self) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        id
    }

    // -----------------------------------------------------------------------
    // Paddle control
    // -----------------------------------------------------------------------

    /// Moves the paddle of whoever holds `conn` in the session.
    ///
    /// Before the first physics step, and whenever the match is not
    /// running, the new board is pushed to both players at once since no
    /// tick will do it.
    pub fn move_paddle(&mut self, session_id: SessionId, conn: ConnectionId, direction: Direction) {
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return;
        };
        let Some(slot) = session.slot_for_connection(conn) else {
            trace!(%session_id, %conn, "move from unseated connection ignored");
            return;
        };
        let physics = &self.config.physics;
        if let Some(player) = session.slot_mut(slot) {
            player.paddle_y = move_paddle(player.paddle_y, direction, physics);
        }

        if session.status != SessionStatus::Active || session.ticks == 0 {
            session.broadcast(ServerMessage::GameUpdate {
                board: session.board(),
                score: session.score,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Game loop
    // -----------------------------------------------------------------------

    /// Runs one tick of the session's loop.
    pub fn tick(&mut self, session_id: SessionId) -> Vec<Effect> {
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return Vec::new();
        };
        if session.status != SessionStatus::Active {
            return Vec::new();
        }
        if !session.both_live() {
            info!(%session_id, "slot lost its connection, pausing");
            session.status = SessionStatus::Paused;
            return Vec::new();
        }

        let paddles = session.paddles();
        let events = advance(
            &mut session.ball,
            paddles,
            &mut session.score,
            &self.config.physics,
            &mut self.rng,
        );
        session.ticks += 1;

        if let Some(scorer) = events.scored {
            session.broadcast(ServerMessage::ScoreUpdate {
                score: session.score,
                scorer,
            });
        }
        session.broadcast(ServerMessage::GameUpdate {
            board: session.board(),
            score: session.score,
        });

        match events.winner {
            Some(winner) => {
                let score = session.score;
                self.finalize(session_id, EndReason::Score, winner, score)
            }
            None => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Sweeper
    // -----------------------------------------------------------------------

    /// Removes sessions older than the configured maximum age that have
    /// nobody connected. Nothing is reported for them.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let max_age = chrono::Duration::from_std(self.config.max_session_age)
            .unwrap_or(chrono::Duration::MAX);

        let stale: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|s| now - s.created_at > max_age && !s.any_live())
            .map(|s| s.id)
            .collect();

        let mut effects = Vec::new();
        for session_id in stale {
            self.sessions.remove(&session_id);
            if let Some(record) = self.records.remove(&session_id) {
                effects.push(Effect::CancelGrace(record.timer));
            }
            if self.waiting == Some(session_id) {
                self.waiting = None;
            }
            effects.push(Effect::StopLoop(session_id));
            info!(%session_id, "stale session swept");
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use volley_protocol::ServerMessage;

    use super::*;
    use crate::ConnectionHandle;

    fn registry() -> SessionRegistry {
        SessionRegistry::with_rng(SessionConfig::default(), StdRng::seed_from_u64(1))
    }

    fn conn(id: u64) -> (ConnectionHandle, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(ConnectionId::new(id), tx), rx)
    }

    #[test]
    fn test_allocate_session_id_is_monotonic() {
        let mut reg = registry();
        assert_eq!(reg.allocate_session_id(), SessionId(1));
        assert_eq!(reg.allocate_session_id(), SessionId(2));
    }

    #[test]
    fn test_tick_unknown_session_is_noop() {
        let mut reg = registry();
        assert!(reg.tick(SessionId(42)).is_empty());
    }

    #[test]
    fn test_move_paddle_in_waiting_session_broadcasts_at_once() {
        let mut reg = registry();
        let (a, mut rx) = conn(1);
        let joined = reg.join(a, "alice", None).unwrap();
        while rx.try_recv().is_ok() {}

        reg.move_paddle(joined.session_id, ConnectionId::new(1), Direction::Up);

        match rx.try_recv() {
            Ok(ServerMessage::GameUpdate { board, .. }) => {
                assert_eq!(board.paddles[0], 285.0);
            }
            other => panic!("expected gameUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_move_paddle_from_unknown_connection_is_ignored() {
        let mut reg = registry();
        let (a, mut rx) = conn(1);
        let joined = reg.join(a, "alice", None).unwrap();
        while rx.try_recv().is_ok() {}

        reg.move_paddle(joined.session_id, ConnectionId::new(99), Direction::Down);

        assert!(rx.try_recv().is_err());
        let s = reg.session(joined.session_id).unwrap();
        assert_eq!(s.paddles()[0], 300.0);
    }

    #[test]
    fn test_tick_winning_point_finalizes_with_natural_score() {
        let mut reg = registry();
        let (a, _ra) = conn(1);
        let (b, mut rb) = conn(2);
        let sid = reg.join(a, "alice", None).unwrap().session_id;
        reg.join(b, "bob", None).unwrap();
        {
            let session = reg.sessions.get_mut(&sid).unwrap();
            session.score = volley_physics::Score::new(4, 4);
            session.ball = volley_physics::Ball { x: 798.0, y: 500.0, vx: 4.0, vy: 1.0 };
            if let Some(p) = session.slot_mut(volley_physics::Slot::Two) {
                p.paddle_y = 100.0;
            }
        }
        while rb.try_recv().is_ok() {}

        let effects = reg.tick(sid);

        let summary = effects
            .iter()
            .find_map(|e| match e {
                Effect::Report(s) => Some(s.clone()),
                _ => None,
            })
            .expect("finished match is reported");
        assert_eq!(summary.reason, EndReason::Score);
        assert_eq!(summary.winner, volley_physics::Slot::One);
        assert_eq!(summary.score, volley_physics::Score::new(5, 4));
        assert!(effects.contains(&Effect::StopLoop(sid)));
        assert!(reg.session(sid).is_none());

        // The last tick's board goes out before the end of the match.
        let kinds: Vec<_> = std::iter::from_fn(|| rb.try_recv().ok()).collect();
        assert!(matches!(
            kinds.as_slice(),
            [
                ServerMessage::ScoreUpdate { .. },
                ServerMessage::GameUpdate { .. },
                ServerMessage::GameEnded { reason: EndReason::Score, .. },
            ]
        ));

        // No further ticks for a finished session.
        assert!(reg.tick(sid).is_empty());
    }

    #[test]
    fn test_sweep_keeps_young_and_connected_sessions() {
        let mut reg = registry();
        let (a, _rx) = conn(1);
        reg.join(a, "alice", None).unwrap();

        let effects = reg.sweep(Utc::now() + chrono::Duration::hours(1));

        assert!(effects.is_empty(), "creator is still connected");
        assert_eq!(reg.session_count(), 1);
    }
}
