//! Configuration management for the server.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Deliveries carried in each live snapshot
    pub recent_deliveries: usize,
    /// Full ledger replay every N admitted commands; 0 disables
    pub replay_check_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            recent_deliveries: 12,
            replay_check_interval: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => defaults.port,
        };

        let recent_deliveries = parse_var("RECENT_DELIVERIES", defaults.recent_deliveries)?;
        let replay_check_interval =
            parse_var("REPLAY_CHECK_INTERVAL", defaults.replay_check_interval)?;

        Ok(Self {
            host,
            port,
            recent_deliveries,
            replay_check_interval,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid {0} value, expected a non-negative integer")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.recent_deliveries, 12);
        assert_eq!(config.replay_check_interval, 30);
    }

    #[test]
    fn parse_var_falls_back_when_unset() {
        let value: usize = parse_var("WICKET_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
