use std::time::Duration;

use volley_physics::PhysicsConfig;
use volley_protocol::MatchType;

/// Settings for every match the registry runs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub physics: PhysicsConfig,

    /// How long a dropped player has to come back before forfeiting.
    pub grace_period: Duration,

    /// Sessions older than this with nobody connected are swept.
    pub max_session_age: Duration,

    /// Reported to the history service with every result.
    pub match_type: MatchType,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            grace_period: Duration::from_secs(5),
            max_session_age: Duration::from_secs(30 * 60),
            match_type: MatchType::Casual,
        }
    }
}

impl SessionConfig {
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_max_session_age(mut self, max_session_age: Duration) -> Self {
        self.max_session_age = max_session_age;
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }
}
