//! Output formatting helpers for CLI commands

use crate::analytics::{
    format_delta, format_error_rate, format_latency, format_throughput, Indicator, SliDeltas,
    Trend,
};
use crate::filter::FilterChip;
use crate::mode::DataSource;
use crate::model::{
    FailureRatePoint, LogEntry, SliSnapshot, StatusClass, StatusCount, UptimeRollup,
    UptimeSample, UptimeSetting,
};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn colored_status(status: u16) -> String {
    let text = status.to_string();
    match StatusClass::from_status(status) {
        StatusClass::Success => text.green().to_string(),
        StatusClass::Redirect | StatusClass::Informational => text.cyan().to_string(),
        StatusClass::ClientError => text.yellow().to_string(),
        StatusClass::ServerError => text.red().to_string(),
        StatusClass::Unknown => text,
    }
}

/// Format log entries as a table
pub fn format_entries_table(entries: &[LogEntry], empty_label: &str) -> String {
    if entries.is_empty() {
        return empty_label.to_string();
    }

    let mut table = new_table(vec!["Date", "Method", "Endpoint", "Status", "Time"]);
    for entry in entries {
        let endpoint = if entry.params.is_empty() {
            entry.endpoint.clone()
        } else {
            format!("{}?{}", entry.endpoint, entry.params)
        };
        table.add_row(vec![
            Cell::new(entry.date.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&entry.method),
            Cell::new(endpoint),
            Cell::new(colored_status(entry.status)),
            Cell::new(format!("{}ms", entry.res_time)),
        ]);
    }

    table.to_string()
}

/// Table of whatever the active source holds, or its placeholder.
pub fn format_data_source(source: &DataSource) -> String {
    format_entries_table(source.entries(), source.empty_label())
}

/// Footer line under a historical page: range label plus active filters.
pub fn format_page_footer(range_label: &str, chips: &[FilterChip]) -> String {
    if chips.is_empty() {
        return range_label.to_string();
    }
    let chips: Vec<String> = chips.iter().map(|c| format!("[{}]", c)).collect();
    format!("{}  {}", range_label, chips.join(" "))
}

/// Format one historical page as JSON
pub fn format_page_json(entries: &[LogEntry], total_items: usize, range_label: &str) -> String {
    to_json(&json!({
        "requests": entries,
        "totalItems": total_items,
        "range": range_label,
    }))
}

fn trend_delta(deltas: &SliDeltas, indicator: Indicator) -> String {
    let delta = deltas.get(indicator);
    let Some(text) = format_delta(delta) else {
        return "-".to_string();
    };
    let arrow = if delta > 0.0 { "↑" } else { "↓" };
    let text = format!("{} {}", arrow, text);
    match deltas.trend(indicator) {
        Trend::Improvement => text.green().to_string(),
        Trend::Regression => text.red().to_string(),
        Trend::Neutral => text,
    }
}

/// Format the SLI snapshot with deltas against the previous period
pub fn format_sli_table(snapshot: &SliSnapshot, comparison: &str) -> String {
    let deltas = SliDeltas::from_snapshot(snapshot);
    let mut table = new_table(vec!["Indicator", "Current", "Previous", "Change"]);

    let rows = [
        (
            Indicator::Latency,
            format_latency(snapshot.average_latency),
            format_latency(snapshot.prev_average_latency),
        ),
        (
            Indicator::ErrorRate,
            format_error_rate(snapshot.error_rate),
            format_error_rate(snapshot.prev_error_rate),
        ),
        (
            Indicator::Throughput,
            format_throughput(snapshot.throughput),
            format_throughput(snapshot.prev_throughput),
        ),
    ];
    for (indicator, current, previous) in rows {
        table.add_row(vec![
            Cell::new(indicator.label()),
            Cell::new(current),
            Cell::new(previous),
            Cell::new(trend_delta(&deltas, indicator)),
        ]);
    }

    format!("{}\nCompared with {}", table, comparison)
}

/// Format the SLI snapshot as JSON
pub fn format_sli_json(snapshot: &SliSnapshot, comparison: &str) -> String {
    let deltas = SliDeltas::from_snapshot(snapshot);
    to_json(&json!({
        "current": {
            "averageLatency": snapshot.average_latency,
            "errorRate": snapshot.error_rate,
            "throughput": snapshot.throughput,
        },
        "previous": {
            "averageLatency": snapshot.prev_average_latency,
            "errorRate": snapshot.prev_error_rate,
            "throughput": snapshot.prev_throughput,
        },
        "deltas": {
            "averageLatency": deltas.latency,
            "errorRate": deltas.error_rate,
            "throughput": deltas.throughput,
        },
        "comparedWith": comparison,
    }))
}

fn colored_uptime(uptime: f64) -> String {
    let text = format!("{:.2} %", uptime);
    if uptime >= 99.0 {
        text.green().to_string()
    } else if uptime >= 90.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format daily roll-ups as a table
pub fn format_daily_uptime_table(rollups: &[UptimeRollup]) -> String {
    if rollups.is_empty() {
        return "No uptime data".to_string();
    }
    let mut table = new_table(vec!["Day", "URL", "Uptime"]);
    for rollup in rollups {
        table.add_row(vec![
            Cell::new(&rollup.day),
            Cell::new(&rollup.url),
            Cell::new(colored_uptime(rollup.average_uptime)),
        ]);
    }
    table.to_string()
}

/// Format overall uptime per URL as a table
pub fn format_total_uptime_table(samples: &[UptimeSample]) -> String {
    if samples.is_empty() {
        return "No uptime data".to_string();
    }
    let mut table = new_table(vec!["URL", "Uptime"]);
    for sample in samples {
        table.add_row(vec![
            Cell::new(&sample.url),
            Cell::new(colored_uptime(sample.uptime)),
        ]);
    }
    table.to_string()
}

pub fn format_uptime_json<T: Serialize>(rows: &[T]) -> String {
    to_json(&json!({ "uptime": rows }))
}

/// Format the failure-rate series and per-status counts
pub fn format_stats_table(points: &[FailureRatePoint], counts: &[StatusCount]) -> String {
    let mut series = new_table(vec!["Hour", "Requests", "Failure rate"]);
    for point in points {
        series.add_row(vec![
            Cell::new(&point.date),
            Cell::new(point.total_requests),
            Cell::new(format_error_rate(point.failure_rate)),
        ]);
    }

    let mut by_status = new_table(vec!["Endpoint", "Status", "Count"]);
    for count in counts {
        let status = count
            .status
            .parse::<u16>()
            .map(colored_status)
            .unwrap_or_else(|_| count.status.clone());
        by_status.add_row(vec![
            Cell::new(&count.endpoint),
            Cell::new(status),
            Cell::new(count.request_count),
        ]);
    }

    format!("{}\n{}", series, by_status)
}

pub fn format_stats_json(points: &[FailureRatePoint], counts: &[StatusCount]) -> String {
    to_json(&json!({
        "failureRate": points,
        "byStatus": counts,
    }))
}

/// Format monitored endpoints as a table
pub fn format_monitors_table(settings: &[UptimeSetting]) -> String {
    if settings.is_empty() {
        return "No monitored endpoints".to_string();
    }
    let mut table = new_table(vec!["Name", "URL", "Method", "Interval", "Enabled"]);
    for setting in settings {
        let enabled = match setting.enabled {
            Some(false) => "no".red().to_string(),
            _ => "yes".green().to_string(),
        };
        table.add_row(vec![
            Cell::new(&setting.name),
            Cell::new(&setting.url),
            Cell::new(setting.method.map(|m| m.to_string()).unwrap_or_default()),
            Cell::new(
                setting
                    .interval
                    .map(|s| format!("{}s", s))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(enabled),
        ]);
    }
    table.to_string()
}

pub fn format_monitors_json(settings: &[UptimeSetting]) -> String {
    to_json(&json!({ "monitors": settings }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, MonitorMethod};
    use chrono::{TimeZone, Utc};

    fn entry(status: u16) -> LogEntry {
        LogEntry {
            date: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            method: "GET".to_string(),
            endpoint: "/api/users".to_string(),
            params: "page=2".to_string(),
            status,
            req_headers: String::new(),
            res_headers: String::new(),
            req_body: None,
            res_body: None,
            res_time: 42,
        }
    }

    #[test]
    fn test_format_entries_table_contains_rows() {
        colored::control::set_override(false);
        let output = format_entries_table(&[entry(200), entry(503)], "empty");
        assert!(output.contains("/api/users?page=2"));
        assert!(output.contains("42ms"));
        assert!(output.contains("503"));
    }

    #[test]
    fn test_format_entries_table_empty_label() {
        let output = format_entries_table(&[], "Waiting for requests");
        assert_eq!(output, "Waiting for requests");
    }

    #[test]
    fn test_format_data_source_placeholder_per_mode() {
        colored::control::set_override(false);
        let historical = DataSource::Historical(crate::model::LogPage::empty());
        assert_eq!(
            format_data_source(&historical),
            "Nothing to display for this timeframe"
        );
        assert_eq!(
            format_data_source(&DataSource::Live(Vec::new())),
            "Waiting for requests"
        );
        assert!(format_data_source(&DataSource::Live(vec![entry(201)])).contains("201"));
    }

    #[test]
    fn test_format_page_footer_with_chips() {
        let chips = vec![
            FilterChip::Method(HttpMethod::Post),
            FilterChip::SlowerThan("250".to_string()),
        ];
        assert_eq!(
            format_page_footer("1-15 of 40", &chips),
            "1-15 of 40  [Method: POST] [> 250 ms]"
        );
        assert_eq!(format_page_footer("0-0 of 0", &[]), "0-0 of 0");
    }

    #[test]
    fn test_format_page_json_shape() {
        let output = format_page_json(&[entry(200)], 31, "1-15 of 31");
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["totalItems"], 31);
        assert_eq!(value["requests"][0]["status"], 200);
    }

    #[test]
    fn test_format_sli_table_marks_unchanged() {
        colored::control::set_override(false);
        let snapshot = SliSnapshot {
            average_latency: 100.0,
            prev_average_latency: 100.0,
            error_rate: 0.1,
            prev_error_rate: 0.2,
            throughput: 2.0,
            prev_throughput: 1.0,
        };
        let output = format_sli_table(&snapshot, "yesterday");
        assert!(output.contains("Compared with yesterday"));
        assert!(output.contains("↓ 50.00 %"));
        assert!(output.contains("↑ 100.00 %"));
    }

    #[test]
    fn test_format_sli_json_deltas() {
        let snapshot = SliSnapshot {
            throughput: 3.0,
            prev_throughput: 2.0,
            ..Default::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_sli_json(&snapshot, "last hour")).unwrap();
        assert_eq!(value["deltas"]["throughput"], 50.0);
        assert_eq!(value["deltas"]["averageLatency"], 0.0);
    }

    #[test]
    fn test_format_monitors_table() {
        colored::control::set_override(false);
        let settings = vec![UptimeSetting {
            url: "https://a.example/health".to_string(),
            name: "api".to_string(),
            method: Some(MonitorMethod::GET),
            interval: Some(60),
            enabled: Some(false),
        }];
        let output = format_monitors_table(&settings);
        assert!(output.contains("https://a.example/health"));
        assert!(output.contains("60s"));
        assert!(output.contains("no"));
        assert_eq!(format_monitors_table(&[]), "No monitored endpoints");
    }
}
