//! Normalization of the raw datetime shapes in Weerlive responses
//!
//! One response mixes Unix timestamps, bare `HH:MM` times, `DD-MM-YYYY`
//! dates and full date-times, all expressed as Dutch wall-clock time no
//! matter where this process runs. A raw value is classified by strict
//! shape matching, first match wins; anything unrecognized yields `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;

/// Timezone all API datetimes are expressed in.
pub const API_TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;

/// Converts a raw snapshot value to a timezone-aware datetime.
///
/// Recognized shapes, tried in order:
/// - positive Unix timestamp (zero or negative means "not set")
/// - `HH:MM`, taken as a time-of-day today
/// - `DD-MM-YYYY`, taken as midnight
/// - `DD-MM-YYYY HH:MM:SS` and `DD-MM-YYYY HH:MM`
pub fn normalize(value: &Value) -> Option<DateTime<Tz>> {
    normalize_at(value, Utc::now().with_timezone(&API_TIMEZONE))
}

/// Like [`normalize`], with an explicit "now" providing the date for the
/// `HH:MM` shape.
pub(crate) fn normalize_at(value: &Value, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    match value {
        Value::Number(number) => {
            let timestamp = number.as_i64()?;
            if timestamp <= 0 {
                return None;
            }
            log::debug!("convert {} to datetime (from timestamp)", timestamp);
            API_TIMEZONE.timestamp_opt(timestamp, 0).single()
        }
        Value::String(raw) => normalize_str(raw, now),
        _ => None,
    }
}

fn normalize_str(raw: &str, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    if matches_shape(raw, "##:##") {
        log::debug!("convert {} to datetime (from time HH:MM)", raw);
        let time = NaiveTime::parse_from_str(raw, "%H:%M").ok()?;
        return local_datetime(now.date_naive().and_time(time));
    }

    if matches_shape(raw, "##-##-####") {
        log::debug!("convert {} to datetime (from date DD-MM-YYYY)", raw);
        let date = NaiveDate::parse_from_str(raw, "%d-%m-%Y").ok()?;
        return local_datetime(date.and_time(NaiveTime::MIN));
    }

    if matches_shape(raw, "##-##-#### ##:##:##") {
        log::debug!("convert {} to datetime (from date and time DD-MM-YYYY HH:MM:SS)", raw);
        let datetime = NaiveDateTime::parse_from_str(raw, "%d-%m-%Y %H:%M:%S").ok()?;
        return local_datetime(datetime);
    }

    if matches_shape(raw, "##-##-#### ##:##") {
        log::debug!("convert {} to datetime (from date and time DD-MM-YYYY HH:MM)", raw);
        let datetime = NaiveDateTime::parse_from_str(raw, "%d-%m-%Y %H:%M").ok()?;
        return local_datetime(datetime);
    }

    None
}

/// Resolves a naive Dutch wall-clock time to an instant. Times that are
/// ambiguous during DST transitions resolve to the earliest valid instant;
/// times skipped by a transition yield `None`.
fn local_datetime(naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    API_TIMEZONE.from_local_datetime(&naive).earliest()
}

/// Strict digit-for-digit shape check: `#` matches one ASCII digit, every
/// other pattern byte must match literally, and lengths must be equal.
fn matches_shape(raw: &str, shape: &str) -> bool {
    raw.len() == shape.len()
        && raw.bytes().zip(shape.bytes()).all(|(byte, pattern)| match pattern {
            b'#' => byte.is_ascii_digit(),
            _ => byte == pattern,
        })
}
