//! Derived weather report
//!
//! Reduces a raw snapshot to the typed values a consumer wants: the current
//! conditions with the two vendor corrections applied, the multi-day and
//! hourly forecasts, the active weather alert and the API usage counters.
//! Every field is read by explicit path and degrades to `None` when absent.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;

use crate::conditions::{self, Condition, SNOW_CORRECTION_MAX_CELSIUS};
use crate::datetime::API_TIMEZONE;
use crate::path;
use crate::snapshot::Snapshot;

/// Weather alert state from the live block
#[derive(Debug, Clone, Default, Serialize)]
pub struct Alert {
    /// True while KNMI has an active alert for the region.
    pub active: bool,
    /// Alert headline.
    pub headline: Option<String>,
    /// Full alert description.
    pub description: Option<String>,
    /// KNMI color code for today ("groen", "geel", "oranje", "rood").
    pub color_code: Option<String>,
}

/// Daily request quota usage reported by the API
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiUsage {
    /// Attribution line for the data source.
    pub source: Option<String>,
    /// Requests allowed per day.
    pub max_requests: Option<i64>,
    /// Requests left for today.
    pub remaining_requests: Option<i64>,
}

/// One day of the multi-day forecast
#[derive(Debug, Clone, Serialize)]
pub struct DailyForecast {
    pub date: Option<DateTime<Tz>>,
    pub condition: Option<Condition>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    /// Chance of precipitation, percent.
    pub precipitation_probability: Option<i64>,
    /// Chance of sunshine, percent.
    pub sunshine_probability: Option<i64>,
    pub wind_bearing: Option<f64>,
    pub wind_direction: Option<String>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_speed_bft: Option<i64>,
}

/// One hour of the hourly forecast
#[derive(Debug, Clone, Serialize)]
pub struct HourlyForecast {
    pub time: Option<DateTime<Tz>>,
    pub condition: Option<Condition>,
    pub temperature: Option<f64>,
    /// Precipitation in mm.
    pub precipitation: Option<f64>,
    /// Solar irradiance in W/m2.
    pub solar_irradiance: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
}

/// Typed view over one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    /// Place name the API resolved the coordinates to.
    pub location: Option<String>,
    /// Observation time as reported by the API.
    pub observed: Option<DateTime<Tz>>,
    /// Current condition, after the day/night and warm-snow corrections.
    pub condition: Option<Condition>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub dew_point: Option<f64>,
    /// Relative humidity, percent.
    pub humidity: Option<i64>,
    /// Air pressure in hPa.
    pub air_pressure: Option<f64>,
    pub wind_bearing: Option<f64>,
    /// Compass name of the wind direction ("WZW", ...).
    pub wind_direction: Option<String>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_speed_bft: Option<i64>,
    pub wind_speed_knots: Option<f64>,
    /// Visibility in meters.
    pub visibility: Option<f64>,
    /// Solar irradiance in W/m2.
    pub solar_irradiance: Option<f64>,
    /// One-line summary ("Licht bewolkt").
    pub summary: Option<String>,
    /// Multi-day textual forecast.
    pub forecast_text: Option<String>,
    pub sunrise: Option<DateTime<Tz>>,
    pub sunset: Option<DateTime<Tz>>,
    /// True when the report was evaluated between sunrise and sunset.
    pub sun_up: bool,
    pub alert: Alert,
    pub api_usage: ApiUsage,
    pub daily: Vec<DailyForecast>,
    pub hourly: Vec<HourlyForecast>,
}

impl WeatherReport {
    /// Builds a report from the snapshot, evaluated at the current time.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::from_snapshot_at(snapshot, Utc::now().with_timezone(&API_TIMEZONE))
    }

    /// Builds a report evaluated at an explicit "now", which anchors the
    /// `HH:MM` sunrise/sunset fields and the day/night condition correction.
    pub fn from_snapshot_at(snapshot: &Snapshot, now: DateTime<Tz>) -> Self {
        let sunrise = snapshot.get_datetime_at(path!["liveweer", 0, "sup"], now);
        let sunset = snapshot.get_datetime_at(path!["liveweer", 0, "sunder"], now);
        let sun_up = is_sun_up(sunrise, sunset, now);
        let temperature = snapshot.get_f64(path!["liveweer", 0, "temp"]);

        Self {
            location: snapshot.get_string(path!["liveweer", 0, "plaats"]),
            observed: snapshot.get_datetime_at(path!["liveweer", 0, "timestamp"], now),
            condition: current_condition(snapshot, temperature, sun_up),
            temperature,
            feels_like: snapshot.get_f64(path!["liveweer", 0, "gtemp"]),
            dew_point: snapshot.get_f64(path!["liveweer", 0, "dauwp"]),
            humidity: snapshot.get_i64(path!["liveweer", 0, "lv"]),
            air_pressure: snapshot.get_f64(path!["liveweer", 0, "luchtd"]),
            wind_bearing: conditions::map_wind_bearing(
                snapshot.get_str(path!["liveweer", 0, "windr"]),
                snapshot.get_f64(path!["liveweer", 0, "windrgr"]),
            ),
            wind_direction: snapshot.get_string(path!["liveweer", 0, "windr"]),
            wind_speed_kmh: snapshot.get_f64(path!["liveweer", 0, "windkmh"]),
            wind_speed_bft: snapshot.get_i64(path!["liveweer", 0, "windbft"]),
            wind_speed_knots: snapshot.get_f64(path!["liveweer", 0, "windknp"]),
            visibility: snapshot.get_f64(path!["liveweer", 0, "zicht"]),
            solar_irradiance: snapshot.get_f64(path!["liveweer", 0, "gr"]),
            summary: snapshot.get_string(path!["liveweer", 0, "samenv"]),
            forecast_text: snapshot.get_string(path!["liveweer", 0, "verw"]),
            sunrise,
            sunset,
            sun_up,
            alert: alert(snapshot),
            api_usage: api_usage(snapshot),
            daily: daily_forecast(snapshot, now),
            hourly: hourly_forecast(snapshot, now),
        }
    }
}

/// Maps the live condition code and applies the two vendor corrections.
fn current_condition(snapshot: &Snapshot, temperature: Option<f64>, sun_up: bool) -> Option<Condition> {
    let raw = snapshot.get_str(path!["liveweer", 0, "image"]);

    match conditions::map_condition(raw)? {
        // The API keeps reporting sunny after sunset.
        Condition::Sunny if !sun_up => Some(Condition::ClearNight),
        // Snow codes show up in conditions too warm for snow.
        Condition::Snowy if temperature.is_some_and(|t| t > SNOW_CORRECTION_MAX_CELSIUS) => {
            Some(Condition::Rainy)
        }
        other => Some(other),
    }
}

/// True when `now` falls between sunrise and sunset. Missing values leave
/// the sun up, so no night correction is applied.
fn is_sun_up(sunrise: Option<DateTime<Tz>>, sunset: Option<DateTime<Tz>>, now: DateTime<Tz>) -> bool {
    match (sunrise, sunset) {
        (Some(up), Some(down)) => up < now && now < down,
        _ => true,
    }
}

fn alert(snapshot: &Snapshot) -> Alert {
    Alert {
        active: snapshot.get_i64(path!["liveweer", 0, "alarm"]) == Some(1),
        headline: non_empty(snapshot.get_string(path!["liveweer", 0, "lkop"])),
        description: non_empty(snapshot.get_string(path!["liveweer", 0, "ltekst"])),
        color_code: non_empty(snapshot.get_string(path!["liveweer", 0, "wrschklr"])),
    }
}

fn api_usage(snapshot: &Snapshot) -> ApiUsage {
    ApiUsage {
        source: snapshot.get_string(path!["api", 0, "bron"]),
        max_requests: snapshot.get_i64(path!["api", 0, "max_verz"]),
        remaining_requests: snapshot.get_i64(path!["api", 0, "rest_verz"]),
    }
}

fn daily_forecast(snapshot: &Snapshot, now: DateTime<Tz>) -> Vec<DailyForecast> {
    (0..block_len(snapshot, "wk_verw"))
        .map(|day| DailyForecast {
            date: snapshot.get_datetime_at(path!["wk_verw", day, "dag"], now),
            condition: conditions::map_condition(snapshot.get_str(path!["wk_verw", day, "image"])),
            min_temperature: snapshot.get_f64(path!["wk_verw", day, "min_temp"]),
            max_temperature: snapshot.get_f64(path!["wk_verw", day, "max_temp"]),
            precipitation_probability: snapshot.get_i64(path!["wk_verw", day, "neersl_perc_dag"]),
            sunshine_probability: snapshot.get_i64(path!["wk_verw", day, "zond_perc_dag"]),
            wind_bearing: conditions::map_wind_bearing(
                snapshot.get_str(path!["wk_verw", day, "windr"]),
                snapshot.get_f64(path!["wk_verw", day, "windrgr"]),
            ),
            wind_direction: snapshot.get_string(path!["wk_verw", day, "windr"]),
            wind_speed_kmh: snapshot.get_f64(path!["wk_verw", day, "windkmh"]),
            wind_speed_bft: snapshot.get_i64(path!["wk_verw", day, "windbft"]),
        })
        .collect()
}

fn hourly_forecast(snapshot: &Snapshot, now: DateTime<Tz>) -> Vec<HourlyForecast> {
    (0..block_len(snapshot, "uur_verw"))
        .map(|hour| HourlyForecast {
            time: snapshot.get_datetime_at(path!["uur_verw", hour, "uur"], now),
            condition: conditions::map_condition(snapshot.get_str(path!["uur_verw", hour, "image"])),
            temperature: snapshot.get_f64(path!["uur_verw", hour, "temp"]),
            precipitation: snapshot.get_f64(path!["uur_verw", hour, "neersl"]),
            solar_irradiance: snapshot.get_f64(path!["uur_verw", hour, "gr"]),
            wind_bearing: conditions::map_wind_bearing(
                snapshot.get_str(path!["uur_verw", hour, "windr"]),
                snapshot.get_f64(path!["uur_verw", hour, "windrgr"]),
            ),
            wind_speed_kmh: snapshot.get_f64(path!["uur_verw", hour, "windkmh"]),
        })
        .collect()
}

/// Number of entries in a forecast block; a missing block is an empty one.
fn block_len(snapshot: &Snapshot, block: &str) -> usize {
    snapshot
        .get(path![block])
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
