//! Fetcher configuration.

use std::time::Duration;

/// Configuration for the [`Fetcher`](crate::Fetcher).
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Read buffer size when streaming a body to disk
    pub chunk_size: usize,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            chunk_size: 8192,
            user_agent: format!("goes-fetcher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("FETCH_CHUNK_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                if size > 0 {
                    config.chunk_size = size;
                }
            }
        }

        if let Ok(val) = std::env::var("FETCH_USER_AGENT") {
            if !val.is_empty() {
                config.user_agent = val;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.chunk_size, 8192);
        assert!(config.user_agent.starts_with("goes-fetcher/"));
    }
}
