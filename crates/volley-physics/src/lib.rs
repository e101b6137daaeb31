//! Deterministic ball-and-paddle simulation for Volley.
//!
//! The crate holds no clock and no I/O. A caller owns the [`Ball`], the
//! paddle positions and the [`Score`], and calls [`advance`] once per tick
//! with a random source of its choice.

mod config;
mod engine;
mod model;

pub use config::PhysicsConfig;
pub use engine::{TickEvents, advance, clamp_paddle, move_paddle, serve};
pub use model::{Ball, Direction, Score, Slot};
