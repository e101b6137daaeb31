//! Simulation constants.

/// Every tunable of the court and the ball.
///
/// Distances are in court units, speeds in court units per tick. The
/// court origin is the top-left corner; `y` grows downward.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    /// Court width. The ball scores when `x` leaves `[0, field_width]`.
    pub field_width: f64,

    /// Court height. The ball bounces off `y = 0` and `y = field_height`.
    pub field_height: f64,

    /// Half the paddle's height. Paddle centres stay at least this far
    /// from the top and bottom walls.
    pub paddle_half_height: f64,

    /// Distance of each paddle's hitting plane from its side wall.
    pub paddle_inset: f64,

    /// How far one move command shifts a paddle.
    pub paddle_step: f64,

    /// Per-axis speed of a freshly served ball.
    pub serve_speed: f64,

    /// Lower bound on `|vx|` and `|vy|` after every tick.
    pub min_speed: f64,

    /// Upper bound on `|vx|` and `|vy|` after every tick.
    pub max_speed: f64,

    /// Multiplier applied to both velocity components on a paddle hit.
    /// Must be greater than 1.
    pub speed_growth: f64,

    /// Largest `vy` change a paddle hit can add (hitting the very edge).
    pub hit_offset: f64,

    /// Largest random `vy` change on a wall bounce.
    pub bounce_jitter: f64,

    /// Points needed to win a match.
    pub win_score: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 600.0,
            paddle_half_height: 50.0,
            paddle_inset: 20.0,
            paddle_step: 15.0,
            serve_speed: 4.0,
            min_speed: 2.0,
            max_speed: 14.0,
            speed_growth: 1.05,
            hit_offset: 3.0,
            bounce_jitter: 0.5,
            win_score: 5,
        }
    }
}

impl PhysicsConfig {
    /// Lowest legal paddle centre.
    pub fn paddle_min_y(&self) -> f64 {
        self.paddle_half_height
    }

    /// Highest legal paddle centre.
    pub fn paddle_max_y(&self) -> f64 {
        self.field_height - self.paddle_half_height
    }

    /// Paddle centre at the start of a match.
    pub fn paddle_start_y(&self) -> f64 {
        self.field_height / 2.0
    }

    /// X coordinate of the left paddle's hitting plane.
    pub fn left_plane(&self) -> f64 {
        self.paddle_inset
    }

    /// X coordinate of the right paddle's hitting plane.
    pub fn right_plane(&self) -> f64 {
        self.field_width - self.paddle_inset
    }
}
