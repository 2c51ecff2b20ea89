//! Weerlive CLI - poll KNMI weather data and print it
//!
//! A thin front end over the library: perform the eager first refresh (a
//! failure here ends the program with a message keyed to the error kind,
//! the way a setup form would show it), then either print a single report
//! or keep polling and printing on every update.

use std::fmt;
use std::process::ExitCode;

use clap::Parser;

use weerlive::api::{ApiClient, WeerliveError};
use weerlive::cli::Cli;
use weerlive::config::Config;
use weerlive::coordinator::{Coordinator, UpdateStatus, WeatherProvider};
use weerlive::diagnostics::diagnostics;
use weerlive::weather::{DailyForecast, WeatherReport};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let config = match cli.to_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let client = ApiClient::new(config.api_key.clone(), config.latitude, config.longitude);
    let coordinator = Coordinator::new(client, config.scan_interval);

    // Eager first fetch; without any data there is nothing to show.
    if let Err(error) = coordinator.first_refresh().await {
        eprintln!("{}", setup_error_message(&error));
        return ExitCode::FAILURE;
    }

    print_current(&cli, &config, &coordinator);

    if cli.once {
        return ExitCode::SUCCESS;
    }

    let _handle = coordinator.spawn();
    let mut updates = coordinator.subscribe();

    while updates.changed().await.is_ok() {
        print_current(&cli, &config, &coordinator);
    }

    ExitCode::SUCCESS
}

/// Mirrors the three setup form errors: bad key, daily limit, connectivity.
fn setup_error_message(error: &WeerliveError) -> String {
    match error {
        WeerliveError::ApiKey => "Setup failed: the given API key is invalid".to_string(),
        WeerliveError::RateLimit => {
            "Setup failed: the API key daily limit is exceeded, try again tomorrow".to_string()
        }
        other => format!("Setup failed: {other}"),
    }
}

/// Prints the current coordinator state in the selected output format.
fn print_current<P: WeatherProvider>(cli: &Cli, config: &Config, coordinator: &Coordinator<P>) {
    let state = coordinator.state();

    if state.status == UpdateStatus::Failed {
        eprintln!("Refresh failed, showing the last known data");
    }

    if cli.diagnostics {
        let dump = diagnostics(config, &state);
        println!("{}", serde_json::to_string_pretty(&dump).unwrap_or_default());
        return;
    }

    let Some(snapshot) = state.snapshot.clone() else {
        return;
    };

    let report = WeatherReport::from_snapshot(&snapshot);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print_report(&config.name, &report);
    }
}

fn print_report(name: &str, report: &WeatherReport) {
    println!(
        "Weather for {} ({})",
        name,
        report.location.as_deref().unwrap_or("unknown location")
    );

    if let Some(observed) = report.observed {
        println!("  observed    {}", observed.format("%d-%m-%Y %H:%M"));
    }

    println!("  condition   {}", display_or_dash(&report.condition));
    println!("  temperature {} °C (feels like {} °C)",
        display_or_dash(&report.temperature),
        display_or_dash(&report.feels_like)
    );
    println!("  humidity    {} %", display_or_dash(&report.humidity));
    println!("  pressure    {} hPa", display_or_dash(&report.air_pressure));
    println!(
        "  wind        {} km/h from {} ({})",
        display_or_dash(&report.wind_speed_kmh),
        display_or_dash(&report.wind_direction),
        display_or_dash(&report.wind_bearing)
    );
    println!("  visibility  {} m", display_or_dash(&report.visibility));

    if let Some(summary) = &report.summary {
        println!("  summary     {}", summary);
    }

    if report.alert.active {
        println!(
            "  ALERT       {}",
            report.alert.headline.as_deref().unwrap_or("weather alert active")
        );
    }

    if !report.daily.is_empty() {
        println!("Forecast:");
        for day in &report.daily {
            print_forecast_day(day);
        }
    }

    if let Some(remaining) = report.api_usage.remaining_requests {
        println!("({} API requests left today)", remaining);
    }
}

fn print_forecast_day(day: &DailyForecast) {
    let date = match day.date {
        Some(date) => date.format("%d-%m-%Y").to_string(),
        None => "-".to_string(),
    };

    println!(
        "  {}  {}  {} / {} °C, {} % rain",
        date,
        display_or_dash(&day.condition),
        display_or_dash(&day.min_temperature),
        display_or_dash(&day.max_temperature),
        display_or_dash(&day.precipitation_probability)
    );
}

/// Missing values render as a dash, the way the API itself fills gaps.
fn display_or_dash<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}
