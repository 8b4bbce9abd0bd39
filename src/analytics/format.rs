//! Display strings for indicator values.

/// `"12.34 %"` for a non-zero delta, `None` when there is nothing to show.
pub fn format_delta(delta: f64) -> Option<String> {
    if delta == 0.0 || delta.is_nan() {
        return None;
    }
    Some(format!("{:.2} %", delta.abs()))
}

/// Milliseconds, switching to seconds above one second.
pub fn format_latency(ms: f64) -> String {
    if ms > 1000.0 {
        format!("{:.2} s", ms / 1000.0)
    } else {
        format!("{:.0} ms", ms)
    }
}

/// Fraction in [0, 1] shown as a percentage.
pub fn format_error_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

pub fn format_throughput(rps: f64) -> String {
    format!("{:.2} req/s", rps)
}
