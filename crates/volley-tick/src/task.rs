//! Spawned loops and timers with drop-to-cancel handles.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::{TickConfig, TickInfo, TickScheduler};

/// Owns a running tick loop. Dropping the handle stops the loop.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Whether the loop has ended on its own or been aborted.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs `on_tick` once per tick on a new task until it returns `false` or
/// the returned handle is dropped.
pub fn spawn_ticker<F>(config: TickConfig, mut on_tick: F) -> TickerHandle
where
    F: FnMut(TickInfo) -> bool + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut scheduler = TickScheduler::new(config);
        loop {
            let info = scheduler.wait_for_tick().await;
            if !on_tick(info) {
                let metrics = scheduler.metrics();
                debug!(
                    ticks = metrics.total_ticks,
                    overruns = metrics.total_overruns,
                    skipped = metrics.total_skipped,
                    "ticker stopped by callback"
                );
                break;
            }
        }
    });
    TickerHandle { task }
}

/// A pending one-shot timer. Dropping the handle cancels it.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Whether the timer has fired or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Calls `fire` once, `after` from now, unless the handle is dropped first.
pub fn spawn_timer<F>(after: Duration, fire: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(after).await;
        fire();
    });
    TimerHandle { task }
}
