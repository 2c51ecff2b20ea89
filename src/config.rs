//! Configuration values for the polling client
//!
//! The host side (CLI arguments here, a settings form in other front ends)
//! hands the library already-validated primitives; the documented poll
//! interval bounds are enforced once, in this module, so every front end
//! gets the same rule.

use std::time::Duration;

use thiserror::Error;

/// Default poll interval.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(300);

/// Smallest allowed poll interval.
pub const MIN_SCAN_INTERVAL: Duration = Duration::from_secs(300);

/// Largest allowed poll interval.
pub const MAX_SCAN_INTERVAL: Duration = Duration::from_secs(86400);

/// Errors for invalid configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The poll interval is outside the supported range
    #[error(
        "scan interval must be between {min} and {max} seconds, got {got}",
        min = MIN_SCAN_INTERVAL.as_secs(),
        max = MAX_SCAN_INTERVAL.as_secs(),
        got = .0.as_secs()
    )]
    ScanIntervalOutOfRange(Duration),
}

/// Validated configuration for one monitored location
#[derive(Debug, Clone)]
pub struct Config {
    /// Display name for the location
    pub name: String,
    /// Weerlive API key
    pub api_key: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Time between two polls
    pub scan_interval: Duration,
}

impl Config {
    /// Creates a configuration, enforcing the scan interval bounds.
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        latitude: f64,
        longitude: f64,
        scan_interval: Duration,
    ) -> Result<Self, ConfigError> {
        if scan_interval < MIN_SCAN_INTERVAL || scan_interval > MAX_SCAN_INTERVAL {
            return Err(ConfigError::ScanIntervalOutOfRange(scan_interval));
        }

        Ok(Self {
            name: name.into(),
            api_key: api_key.into(),
            latitude,
            longitude,
            scan_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(scan_interval: Duration) -> Result<Config, ConfigError> {
        Config::new("Home", "abc123xyz000", 52.354, 4.763, scan_interval)
    }

    #[test]
    fn test_config_accepts_default_interval() {
        let config = make_config(DEFAULT_SCAN_INTERVAL).expect("Default interval should be valid");
        assert_eq!(config.name, "Home");
        assert_eq!(config.api_key, "abc123xyz000");
        assert!((config.latitude - 52.354).abs() < 1e-9);
        assert!((config.longitude - 4.763).abs() < 1e-9);
        assert_eq!(config.scan_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_config_accepts_interval_bounds() {
        assert!(make_config(MIN_SCAN_INTERVAL).is_ok());
        assert!(make_config(MAX_SCAN_INTERVAL).is_ok());
    }

    #[test]
    fn test_config_rejects_interval_below_minimum() {
        let result = make_config(Duration::from_secs(299));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::ScanIntervalOutOfRange(Duration::from_secs(299))
        );
    }

    #[test]
    fn test_config_rejects_interval_above_maximum() {
        let result = make_config(Duration::from_secs(86401));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::ScanIntervalOutOfRange(Duration::from_secs(86401))
        );
    }

    #[test]
    fn test_config_error_names_the_bounds() {
        let error = make_config(Duration::from_secs(60)).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("300"), "Message should name the minimum: {}", message);
        assert!(message.contains("86400"), "Message should name the maximum: {}", message);
        assert!(message.contains("60"), "Message should name the given value: {}", message);
    }
}
