use std::time::Duration;

/// Network-facing settings for [`VolleyServer`](crate::VolleyServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// How long a fresh connection has to send its `join`.
    pub join_timeout: Duration,

    /// How often stale sessions are swept.
    pub sweep_period: Duration,

    /// Where finished matches are POSTed. `None` logs them only.
    pub history_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            join_timeout: Duration::from_secs(5),
            sweep_period: Duration::from_secs(5 * 60),
            history_url: None,
        }
    }
}

impl ServerConfig {
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    pub fn with_sweep_period(mut self, period: Duration) -> Self {
        self.sweep_period = period;
        self
    }

    pub fn with_history_url(mut self, url: impl Into<String>) -> Self {
        self.history_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ServerConfig::default();
        assert_eq!(config.join_timeout, Duration::from_secs(5));
        assert_eq!(config.sweep_period, Duration::from_secs(300));
        assert!(config.history_url.is_none());
    }

    #[test]
    fn test_with_history_url_sets_url() {
        let config = ServerConfig::default().with_history_url("http://history/matches");
        assert_eq!(config.history_url.as_deref(), Some("http://history/matches"));
    }
}
