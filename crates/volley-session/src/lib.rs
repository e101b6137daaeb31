//! Session engine core for Volley.
//!
//! [`SessionRegistry`] owns every live match. It pairs players, runs the
//! per-tick physics, supervises disconnects and finalizes results, all as
//! plain synchronous calls. Anything that needs a timer, a task or a
//! network round trip comes back to the caller as an [`Effect`].
//!
//! ```text
//! join ──> Waiting ──(second join)──> Active ──> tick, tick, ...
//!                                       │
//!                         disconnect / grace expiry / win
//!                                       │
//!                                       v
//!                          Finished: Effect::Report + removal
//! ```

mod config;
mod effect;
mod error;
mod matchmaker;
mod registry;
mod session;
mod supervisor;

pub use config::SessionConfig;
pub use effect::Effect;
pub use error::SessionError;
pub use matchmaker::Joined;
pub use registry::SessionRegistry;
pub use session::{
    ClientSender, ConnectionHandle, DisconnectRecord, PlayerSlot, Session, SessionStatus, TimerId,
};
