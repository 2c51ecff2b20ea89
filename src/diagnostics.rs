//! Diagnostics export
//!
//! A dump of the configuration and the raw current snapshot that is safe to
//! attach to a bug report: the API key and the home coordinates are scrubbed
//! before export.

use serde_json::{json, Value};

use crate::config::Config;
use crate::coordinator::CoordinatorState;

/// Replacement for values that identify the account or the location.
const REDACTED: &str = "**REDACTED**";

/// Builds the redacted diagnostics dump.
pub fn diagnostics(config: &Config, state: &CoordinatorState) -> Value {
    json!({
        "config": {
            "name": config.name,
            "api_key": REDACTED,
            "latitude": REDACTED,
            "longitude": REDACTED,
            "scan_interval": config.scan_interval.as_secs(),
        },
        "data": state
            .snapshot
            .as_ref()
            .map_or_else(|| json!({}), |snapshot| snapshot.raw().clone()),
    })
}
