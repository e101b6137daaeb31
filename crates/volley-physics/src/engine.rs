//! The per-tick state transition.
//!
//! Everything here is a plain function of its inputs plus the random source
//! handed in. Seed the source and the whole rally replays bit for bit.

use rand::Rng;
use tracing::trace;

use crate::{Ball, Direction, PhysicsConfig, Score, Slot};

/// What happened during one [`advance`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// The slot that scored this tick.
    pub scored: Option<Slot>,
    /// The slot that reached the win score this tick.
    pub winner: Option<Slot>,
}

/// A ball at the centre of the court heading in a random diagonal.
pub fn serve<R: Rng + ?Sized>(config: &PhysicsConfig, rng: &mut R) -> Ball {
    let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    Ball {
        x: config.field_width / 2.0,
        y: config.field_height / 2.0,
        vx: sx * config.serve_speed,
        vy: sy * config.serve_speed,
    }
}

/// Clamps a paddle centre into its legal range.
pub fn clamp_paddle(y: f64, config: &PhysicsConfig) -> f64 {
    y.clamp(config.paddle_min_y(), config.paddle_max_y())
}

/// Shifts a paddle one step in `direction`, staying in bounds.
pub fn move_paddle(y: f64, direction: Direction, config: &PhysicsConfig) -> f64 {
    let delta = match direction {
        Direction::Up => -config.paddle_step,
        Direction::Down => config.paddle_step,
    };
    clamp_paddle(y + delta, config)
}

/// Advances the ball by one tick.
///
/// `paddles` holds the paddle centres indexed by [`Slot::index`]. Points
/// are added to `score`; on a point the ball is re-served from the centre.
pub fn advance<R: Rng + ?Sized>(
    ball: &mut Ball,
    paddles: [f64; 2],
    score: &mut Score,
    config: &PhysicsConfig,
    rng: &mut R,
) -> TickEvents {
    let mut events = TickEvents::default();
    let prev_x = ball.x;

    ball.x += ball.vx;
    ball.y += ball.vy;

    // Walls. The new vy always points back into the court; jitter only
    // changes its magnitude.
    if ball.y <= 0.0 || ball.y >= config.field_height {
        let inward = if ball.y <= 0.0 { 1.0 } else { -1.0 };
        let jitter = if config.bounce_jitter > 0.0 {
            rng.random_range(-config.bounce_jitter..=config.bounce_jitter)
        } else {
            0.0
        };
        ball.vy = inward * (ball.vy.abs() + jitter).max(config.min_speed);
        ball.y = ball.y.clamp(0.0, config.field_height);
    }

    // Paddles.
    let left = config.left_plane();
    let right = config.right_plane();
    if ball.vx < 0.0 && prev_x >= left && ball.x <= left {
        deflect(ball, left, paddles[Slot::One.index()], config);
    } else if ball.vx > 0.0 && prev_x <= right && ball.x >= right {
        deflect(ball, right, paddles[Slot::Two.index()], config);
    }

    // Goals.
    let scorer = if ball.x < 0.0 {
        Some(Slot::Two)
    } else if ball.x > config.field_width {
        Some(Slot::One)
    } else {
        None
    };
    if let Some(slot) = scorer {
        score.increment(slot);
        trace!(%slot, %score, "point scored");
        *ball = serve(config, rng);
        events.scored = Some(slot);
        events.winner = score.winner(config.win_score);
    }

    ball.vx = clamp_axis(ball.vx, config);
    ball.vy = clamp_axis(ball.vy, config);

    events
}

/// Bounces the ball off a paddle at `plane` if it is within the paddle's
/// vertical reach.
fn deflect(ball: &mut Ball, plane: f64, paddle_y: f64, config: &PhysicsConfig) {
    let half = config.paddle_half_height;
    if ball.y < paddle_y - half || ball.y > paddle_y + half {
        return;
    }
    let contact = ((ball.y - paddle_y) / half).clamp(-1.0, 1.0);
    ball.x = plane;
    ball.vx = -ball.vx * config.speed_growth;
    ball.vy = (ball.vy + contact * config.hit_offset) * config.speed_growth;
}

/// Clamps one velocity component's magnitude, keeping its sign.
fn clamp_axis(v: f64, config: &PhysicsConfig) -> f64 {
    let magnitude = v.abs().clamp(config.min_speed, config.max_speed);
    if v < 0.0 { -magnitude } else { magnitude }
}
