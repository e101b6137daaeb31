//! Fixed-rate match loops and one-shot timers for Volley.
//!
//! A [`TickScheduler`] paces a loop at a fixed rate. [`spawn_ticker`] runs
//! one on its own task and calls back every tick; [`spawn_timer`] fires a
//! callback once after a delay. Both hand back a handle that cancels the
//! task when dropped, so owning the handle is owning the loop.
//!
//! ```ignore
//! let handle = spawn_ticker(TickConfig::with_rate(60), move |_| {
//!     engine_tx.send(Command::Tick(session_id)).is_ok()
//! });
//! // ...
//! drop(handle); // loop stops
//! ```

mod scheduler;
mod task;

pub use scheduler::{TickConfig, TickInfo, TickMetrics, TickPolicy, TickScheduler};
pub use task::{TickerHandle, TimerHandle, spawn_ticker, spawn_timer};
