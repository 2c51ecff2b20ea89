//! Weerlive client library
//!
//! Polls KNMI weather data from the Weerlive API, normalizes the JSON
//! response into an immutable snapshot, and derives typed weather reports
//! from it. The update coordinator owns the poll interval and the last
//! successful snapshot; consumers read the snapshot by path or through the
//! derived [`weather::WeatherReport`].

pub mod api;
pub mod cli;
pub mod conditions;
pub mod config;
pub mod coordinator;
pub mod datetime;
pub mod diagnostics;
pub mod snapshot;
pub mod weather;

pub use api::{ApiClient, WeerliveError};
pub use conditions::Condition;
pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorState, RefreshHandle, UpdateStatus, WeatherProvider};
pub use snapshot::{PathKey, Snapshot};
pub use weather::WeatherReport;
