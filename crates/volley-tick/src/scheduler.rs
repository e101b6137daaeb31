use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick wakes up late.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one from now.
    #[default]
    Skip,
    /// Keep the original cadence. Late ticks fire back to back until the
    /// loop is on schedule again.
    Drop,
}

/// Configuration for a [`TickScheduler`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second, between 1 and [`Self::MAX_TICK_RATE_HZ`].
    pub tick_rate_hz: u32,
    /// Overrun handling.
    pub policy: TickPolicy,
    /// Random delay (0 to this many microseconds) added before the first
    /// tick so matches created together do not tick in lockstep.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            policy: TickPolicy::default(),
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Brings the rate into `1..=MAX_TICK_RATE_HZ`.
    pub fn validated(mut self) -> Self {
        let clamped = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        if clamped != self.tick_rate_hz {
            warn!(
                rate = self.tick_rate_hz,
                clamped,
                "tick_rate_hz out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        self
    }

    /// Length of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

// ---------------------------------------------------------------------------
// Tick info and metrics
// ---------------------------------------------------------------------------

/// Returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Whether this tick woke more than a tenth of a tick late.
    pub overrun: bool,
    /// Ticks given up because of the overrun (only under [`TickPolicy::Skip`]).
    pub ticks_skipped: u64,
}

/// Running totals over the life of a scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Paces a loop at a fixed rate.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Duration,
    tick_count: u64,
    next_tick: Instant,
    metrics: TickMetrics,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let jitter = if config.initial_jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
        } else {
            Duration::ZERO
        };

        debug!(
            rate_hz = config.tick_rate_hz,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick: Instant::now() + tick_duration + jitter,
            metrics: TickMetrics::default(),
        }
    }

    /// Sleeps until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let due = self.next_tick;
        time::sleep_until(due).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > self.tick_duration / 10;
        let mut ticks_skipped = 0;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped =
                        (late_by.as_nanos() / self.tick_duration.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "tick overrun, skipping ahead"
                        );
                    }
                }
                now + self.tick_duration
            }
            TickPolicy::Drop => due + self.tick_duration,
        };

        if overrun {
            self.metrics.total_overruns += 1;
        }
        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }
}
