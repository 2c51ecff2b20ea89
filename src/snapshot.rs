//! Parsed API snapshot and path-based value access
//!
//! A snapshot is the raw JSON tree exactly as the API returned it, replaced
//! wholesale on each successful poll. Fields are read by explicit path; a
//! missing path is a normal, loggable condition that degrades to `None`,
//! never an error. The upstream schema is only informally documented, so a
//! successful lookup also logs the runtime type it resolved.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;

use crate::datetime;

/// One step in a snapshot path: an object field or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKey<'a> {
    Field(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathKey<'a> {
    fn from(name: &'a str) -> Self {
        PathKey::Field(name)
    }
}

impl<'a> From<usize> for PathKey<'a> {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

impl fmt::Display for PathKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Field(name) => f.write_str(name),
            PathKey::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Builds a snapshot path from string and integer literals.
///
/// ```
/// use weerlive::{path, Snapshot};
///
/// let snapshot = Snapshot::new(serde_json::json!({"liveweer": [{"temp": 10.5}]}));
/// assert_eq!(snapshot.get_f64(path!["liveweer", 0, "temp"]), Some(10.5));
/// ```
#[macro_export]
macro_rules! path {
    ($($key:expr),* $(,)?) => {
        &[$($crate::snapshot::PathKey::from($key)),*]
    };
}

fn join_path(path: &[PathKey<'_>]) -> String {
    let mut joined = String::new();
    for (position, key) in path.iter().enumerate() {
        if position > 0 {
            joined.push('/');
        }
        joined.push_str(&key.to_string());
    }
    joined
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_i64() || number.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Immutable parsed API response.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    data: Value,
}

impl Snapshot {
    /// Wraps a parsed API response.
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Raw response tree, for the diagnostics export.
    pub fn raw(&self) -> &Value {
        &self.data
    }

    /// Looks up a value by path.
    ///
    /// Returns `None` and logs a warning when any step of the path is
    /// missing. The runtime type of a resolved value is logged at debug
    /// level to help diagnose field shapes against the live API.
    pub fn get(&self, path: &[PathKey<'_>]) -> Option<&Value> {
        let mut value = &self.data;

        for key in path {
            let next = match (key, value) {
                (PathKey::Field(name), Value::Object(map)) => map.get(*name),
                (PathKey::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            };

            match next {
                Some(inner) => value = inner,
                None => {
                    log::warn!("Can't find a value for {} in the API response", join_path(path));
                    return None;
                }
            }
        }

        match value {
            Value::Number(_) | Value::String(_) => {
                log::debug!(
                    "Path {} returns a {} (value = {})",
                    join_path(path),
                    type_label(value),
                    value
                );
            }
            _ => log::debug!("Path {} returns a {}", join_path(path), type_label(value)),
        }

        Some(value)
    }

    /// Looks up a floating point value, coercing numbers the API carries as
    /// strings (`"temp": "10.5"` in older API versions).
    pub fn get_f64(&self, path: &[PathKey<'_>]) -> Option<f64> {
        match self.get(path)? {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    /// Looks up an integer value, with the same string coercion as
    /// [`Snapshot::get_f64`].
    pub fn get_i64(&self, path: &[PathKey<'_>]) -> Option<i64> {
        match self.get(path)? {
            Value::Number(number) => number.as_i64(),
            Value::String(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    /// Looks up a string value.
    pub fn get_str(&self, path: &[PathKey<'_>]) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Looks up a string value as an owned `String`.
    pub fn get_string(&self, path: &[PathKey<'_>]) -> Option<String> {
        self.get_str(path).map(str::to_owned)
    }

    /// Looks up a datetime in any of the raw shapes the API uses.
    pub fn get_datetime(&self, path: &[PathKey<'_>]) -> Option<DateTime<Tz>> {
        datetime::normalize(self.get(path)?)
    }

    pub(crate) fn get_datetime_at(
        &self,
        path: &[PathKey<'_>],
        now: DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        datetime::normalize_at(self.get(path)?, now)
    }
}
