//! Analytics Engine.
//!
//! Pure derivations over the aggregate endpoints: SLI deltas, their
//! classification, comparison-period labels and daily uptime roll-ups.
//! Nothing here touches the filter state or the active mode.

mod format;
mod sli;
mod uptime;

pub use format::{format_delta, format_error_rate, format_latency, format_throughput};
pub use sli::{classify, comparison_label, percentage_delta, Indicator, SliDeltas, Trend};
pub use uptime::{bucket_day, daily_uptime, daily_uptime_by_url};
