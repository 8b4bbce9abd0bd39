//! Wire types shared by the API client, the stream client and the analytics
//! functions.
//!
//! Field names follow the backend's JSON exactly: log entries are snake_case,
//! aggregate payloads are camelCase.

mod entry;
mod metrics;
mod uptime;

pub use entry::{HttpMethod, LogEntry, LogPage, StatusClass};
pub use metrics::{FailureRatePoint, SliSnapshot, StatusCount};
pub use uptime::{MonitorMethod, UptimeRollup, UptimeSample, UptimeSetting, UptimeType};
