//! The engine actor: one task that owns the [`SessionRegistry`].
//!
//! Connection handlers, tick loops, grace timers and the sweeper all talk
//! to it through [`EngineCommand`]s, which it applies one at a time. The
//! [`Effect`]s the registry hands back are carried out here: loops and
//! timers become owned task handles, results go to the [`ResultSink`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use volley_protocol::{Direction, MatchSummary, SessionId, Slot};
use volley_report::ResultSink;
use volley_session::{ConnectionHandle, Effect, SessionError, SessionRegistry, TimerId};
use volley_tick::{TickConfig, TickerHandle, TimerHandle, spawn_ticker, spawn_timer};
use volley_transport::ConnectionId;

use crate::VolleyError;

/// Where a connection was seated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub session_id: SessionId,
    pub slot: Slot,
    pub reconnected: bool,
}

/// Commands processed by the engine task.
pub(crate) enum EngineCommand {
    Join {
        conn: ConnectionHandle,
        identity: String,
        resume: Option<SessionId>,
        reply: oneshot::Sender<Result<Seat, SessionError>>,
    },
    Move {
        session_id: SessionId,
        conn: ConnectionId,
        direction: Direction,
    },
    Disconnect {
        session_id: SessionId,
        conn: ConnectionId,
    },
    Tick(SessionId),
    GraceExpired {
        session_id: SessionId,
        timer: TimerId,
    },
    Sweep,
    SessionCount {
        reply: oneshot::Sender<usize>,
    },
}

/// Cheap, cloneable handle for sending commands to the engine.
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    /// Asks the matchmaker to seat `identity`. Server messages for the
    /// seat are delivered through `conn`.
    pub async fn join(
        &self,
        conn: ConnectionHandle,
        identity: impl Into<String>,
        resume: Option<SessionId>,
    ) -> Result<Seat, VolleyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(EngineCommand::Join {
                conn,
                identity: identity.into(),
                resume,
                reply: reply_tx,
            })
            .map_err(|_| VolleyError::EngineUnavailable)?;
        let seat = reply_rx.await.map_err(|_| VolleyError::EngineUnavailable)??;
        Ok(seat)
    }

    /// Forwards a paddle move (fire-and-forget).
    pub fn send_move(
        &self,
        session_id: SessionId,
        conn: ConnectionId,
        direction: Direction,
    ) -> Result<(), VolleyError> {
        self.send(EngineCommand::Move {
            session_id,
            conn,
            direction,
        })
    }

    /// Reports that `conn` is gone. Callable from `Drop`.
    pub fn disconnect(&self, session_id: SessionId, conn: ConnectionId) -> Result<(), VolleyError> {
        self.send(EngineCommand::Disconnect { session_id, conn })
    }

    /// Requests a sweep of stale sessions.
    pub fn sweep(&self) -> Result<(), VolleyError> {
        self.send(EngineCommand::Sweep)
    }

    /// Number of sessions the registry currently holds.
    pub async fn session_count(&self) -> Result<usize, VolleyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::SessionCount { reply: reply_tx })?;
        reply_rx.await.map_err(|_| VolleyError::EngineUnavailable)
    }

    fn send(&self, cmd: EngineCommand) -> Result<(), VolleyError> {
        self.sender
            .send(cmd)
            .map_err(|_| VolleyError::EngineUnavailable)
    }
}

/// Spawns the engine task. It runs until every [`EngineHandle`] is dropped.
pub fn spawn_engine<S: ResultSink>(
    registry: SessionRegistry,
    tick_config: TickConfig,
    sink: S,
) -> (EngineHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = Engine {
        registry,
        tick_config,
        sink: Arc::new(sink),
        tickers: HashMap::new(),
        timers: HashMap::new(),
        // Loops and timers hold a weak sender so they never keep the
        // engine alive on their own.
        loopback: tx.downgrade(),
        receiver: rx,
    };
    let task = tokio::spawn(engine.run());
    (EngineHandle { sender: tx }, task)
}

struct Engine<S: ResultSink> {
    registry: SessionRegistry,
    tick_config: TickConfig,
    sink: Arc<S>,
    /// At most one loop per session.
    tickers: HashMap<SessionId, TickerHandle>,
    timers: HashMap<TimerId, TimerHandle>,
    loopback: mpsc::WeakUnboundedSender<EngineCommand>,
    receiver: mpsc::UnboundedReceiver<EngineCommand>,
}

impl<S: ResultSink> Engine<S> {
    async fn run(mut self) {
        info!("session engine started");
        while let Some(cmd) = self.receiver.recv().await {
            self.handle(cmd);
        }
        info!(
            sessions = self.registry.session_count(),
            "session engine stopped"
        );
    }

    fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Join {
                conn,
                identity,
                resume,
                reply,
            } => {
                let result = match self.registry.join(conn, &identity, resume) {
                    Ok(joined) => {
                        let seat = Seat {
                            session_id: joined.session_id,
                            slot: joined.slot,
                            reconnected: joined.reconnected,
                        };
                        self.apply(joined.effects);
                        Ok(seat)
                    }
                    Err(e) => {
                        debug!(%identity, error = %e, "join rejected");
                        Err(e)
                    }
                };
                let _ = reply.send(result);
            }
            EngineCommand::Move {
                session_id,
                conn,
                direction,
            } => {
                self.registry.move_paddle(session_id, conn, direction);
            }
            EngineCommand::Disconnect { session_id, conn } => {
                let effects = self.registry.disconnect(session_id, conn);
                self.apply(effects);
            }
            EngineCommand::Tick(session_id) => {
                let effects = self.registry.tick(session_id);
                self.apply(effects);
            }
            EngineCommand::GraceExpired { session_id, timer } => {
                self.timers.remove(&timer);
                let effects = self.registry.grace_expired(session_id, timer);
                self.apply(effects);
            }
            EngineCommand::Sweep => {
                let effects = self.registry.sweep(Utc::now());
                self.apply(effects);
            }
            EngineCommand::SessionCount { reply } => {
                let _ = reply.send(self.registry.session_count());
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartLoop(session_id) => self.start_loop(session_id),
                Effect::StopLoop(session_id) => {
                    if self.tickers.remove(&session_id).is_some() {
                        debug!(%session_id, "match loop stopped");
                    }
                }
                Effect::ArmGrace {
                    session_id,
                    timer,
                    after,
                } => self.arm_grace(session_id, timer, after),
                Effect::CancelGrace(timer) => {
                    if self.timers.remove(&timer).is_some() {
                        debug!(%timer, "grace timer cancelled");
                    }
                }
                Effect::Report(summary) => self.report(summary),
            }
        }
    }

    fn start_loop(&mut self, session_id: SessionId) {
        let loopback = self.loopback.clone();
        let ticker = spawn_ticker(self.tick_config.clone(), move |info| {
            trace!(%session_id, tick = info.tick, "tick");
            match loopback.upgrade() {
                Some(tx) => tx.send(EngineCommand::Tick(session_id)).is_ok(),
                None => false,
            }
        });
        debug!(%session_id, rate = self.tick_config.tick_rate_hz, "match loop started");
        // Replacing an old handle drops it, which stops that loop.
        self.tickers.insert(session_id, ticker);
    }

    fn arm_grace(&mut self, session_id: SessionId, timer: TimerId, after: Duration) {
        let loopback = self.loopback.clone();
        let handle = spawn_timer(after, move || {
            if let Some(tx) = loopback.upgrade() {
                let _ = tx.send(EngineCommand::GraceExpired { session_id, timer });
            }
        });
        self.timers.insert(timer, handle);
    }

    fn report(&self, summary: MatchSummary) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.report(&summary).await {
                warn!(
                    session_id = %summary.session_id,
                    error = %e,
                    "failed to deliver match result"
                );
            }
        });
    }
}
