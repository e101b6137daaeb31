//! # Volley
//!
//! Server-authoritative backend for a two-player paddle game played over
//! WebSockets.
//!
//! Players connect, send a `join`, and are paired two to a session. The
//! server owns the ball: it steps the physics at a fixed rate, streams
//! the board to both players, holds a dropped player's slot for a grace
//! period, and reports every finished match to a history service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volley::prelude::*;
//!
//! # async fn start() -> Result<(), VolleyError> {
//! let server = VolleyServer::builder().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod engine;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use engine::{EngineHandle, Seat, spawn_engine};
pub use error::VolleyError;
pub use server::{VolleyServer, VolleyServerBuilder};

pub use volley_physics::PhysicsConfig;
pub use volley_protocol::{ClientMessage, EndReason, MatchSummary, MatchType, ServerMessage, SessionId};
pub use volley_report::{HistorySink, HttpResultSink, NoopResultSink, ReportError, ResultSink};
pub use volley_session::{SessionConfig, SessionRegistry};
pub use volley_tick::{TickConfig, TickPolicy};

pub mod prelude {
    pub use crate::{
        ClientMessage, EndReason, MatchSummary, MatchType, PhysicsConfig, ReportError, ResultSink,
        ServerConfig, ServerMessage, SessionConfig, SessionId, TickConfig, VolleyError,
        VolleyServer, VolleyServerBuilder,
    };
    pub use volley_protocol::{Direction, Score, Slot};
}
