//! Daily roll-up of hourly uptime samples.

use crate::model::{UptimeRollup, UptimeSample};
use std::collections::BTreeMap;

/// Calendar day of an hour bucket (`"2024-01-01 13:00:00"` → `"2024-01-01"`).
pub fn bucket_day(hour: &str) -> &str {
    hour.split([' ', 'T']).next().unwrap_or(hour)
}

/// Mean uptime per URL per calendar day, ordered by day and then URL.
///
/// Samples without an hour bucket are totals and are skipped.
///
/// ```
/// use reqwatch::analytics::daily_uptime;
/// use reqwatch::model::UptimeSample;
///
/// let sample = |hour: &str, uptime| UptimeSample {
///     url: "https://example.com".to_string(),
///     uptime,
///     hour: Some(hour.to_string()),
/// };
/// let rollup = daily_uptime(&[
///     sample("2024-01-01 00:00:00", 90.0),
///     sample("2024-01-01 12:00:00", 100.0),
///     sample("2024-01-02 00:00:00", 50.0),
/// ]);
/// assert_eq!(rollup.len(), 2);
/// assert_eq!(rollup[0].day, "2024-01-01");
/// assert_eq!(rollup[0].average_uptime, 95.0);
/// assert_eq!(rollup[1].average_uptime, 50.0);
/// ```
pub fn daily_uptime(samples: &[UptimeSample]) -> Vec<UptimeRollup> {
    let mut buckets: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for sample in samples {
        let Some(hour) = sample.hour.as_deref() else {
            continue;
        };
        let entry = buckets
            .entry((bucket_day(hour), sample.url.as_str()))
            .or_insert((0.0, 0));
        entry.0 += sample.uptime;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((day, url), (sum, count))| UptimeRollup {
            url: url.to_string(),
            day: day.to_string(),
            average_uptime: sum / count as f64,
        })
        .collect()
}

/// Daily roll-ups keyed by URL, each series ordered by day.
pub fn daily_uptime_by_url(samples: &[UptimeSample]) -> BTreeMap<String, Vec<UptimeRollup>> {
    let mut by_url: BTreeMap<String, Vec<UptimeRollup>> = BTreeMap::new();
    for rollup in daily_uptime(samples) {
        by_url.entry(rollup.url.clone()).or_default().push(rollup);
    }
    by_url
}
