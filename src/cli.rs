//! Command-line interface parsing
//!
//! This module handles parsing of CLI arguments using clap. The arguments
//! are the same already-validated primitives a host platform would hand the
//! library: API key, coordinates, display name and poll interval.

use std::time::Duration;

use clap::Parser;

use crate::config::{Config, ConfigError};

/// Weerlive CLI - poll KNMI weather data for a location
#[derive(Parser, Debug)]
#[command(name = "weerlive")]
#[command(about = "KNMI weather conditions and forecasts via the Weerlive API")]
#[command(version)]
pub struct Cli {
    /// Weerlive API key, see https://weerlive.nl/api/toegang/account.php
    #[arg(long, env = "WEERLIVE_API_KEY")]
    pub api_key: String,

    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, default_value_t = 52.354)]
    pub latitude: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, default_value_t = 4.763)]
    pub longitude: f64,

    /// Display name for the location
    #[arg(long, default_value = "Home")]
    pub name: String,

    /// Poll interval in seconds (300-86400)
    #[arg(long, default_value_t = 300)]
    pub interval: u64,

    /// Fetch one report, print it, and exit
    #[arg(long)]
    pub once: bool,

    /// Print reports as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Print a redacted diagnostics dump instead of a report
    #[arg(long)]
    pub diagnostics: bool,
}

impl Cli {
    /// Validates the arguments into a library configuration.
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        Config::new(
            self.name.clone(),
            self.api_key.clone(),
            self.latitude,
            self.longitude,
            Duration::from_secs(self.interval),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["weerlive", "--api-key", "abc123xyz000"]);

        assert_eq!(cli.api_key, "abc123xyz000");
        assert!((cli.latitude - 52.354).abs() < 1e-9);
        assert!((cli.longitude - 4.763).abs() < 1e-9);
        assert_eq!(cli.name, "Home");
        assert_eq!(cli.interval, 300);
        assert!(!cli.once);
        assert!(!cli.json);
        assert!(!cli.diagnostics);
    }

    #[test]
    fn test_cli_parses_location_and_interval() {
        let cli = Cli::parse_from([
            "weerlive",
            "--api-key",
            "abc123xyz000",
            "--latitude",
            "53.217",
            "--longitude",
            "6.566",
            "--name",
            "Groningen",
            "--interval",
            "600",
            "--once",
        ]);

        assert!((cli.latitude - 53.217).abs() < 1e-9);
        assert!((cli.longitude - 6.566).abs() < 1e-9);
        assert_eq!(cli.name, "Groningen");
        assert_eq!(cli.interval, 600);
        assert!(cli.once);
    }

    #[test]
    fn test_cli_accepts_negative_coordinates() {
        let cli = Cli::parse_from([
            "weerlive",
            "--api-key",
            "abc123xyz000",
            "--latitude",
            "-33.92",
            "--longitude",
            "-70.57",
        ]);

        assert!((cli.latitude + 33.92).abs() < 1e-9);
        assert!((cli.longitude + 70.57).abs() < 1e-9);
    }

    #[test]
    fn test_to_config_applies_interval_bounds() {
        let mut cli = Cli::parse_from(["weerlive", "--api-key", "abc123xyz000"]);

        cli.interval = 600;
        assert!(cli.to_config().is_ok());

        cli.interval = 60;
        assert_eq!(
            cli.to_config().unwrap_err(),
            ConfigError::ScanIntervalOutOfRange(Duration::from_secs(60))
        );
    }
}
