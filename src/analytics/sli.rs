//! SLI period-over-period deltas and their classification.

use crate::model::SliSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Relative change from `previous` to `current`, in percent.
///
/// A previous value of zero has no meaningful baseline and yields `0.0`.
///
/// ```
/// use reqwatch::analytics::percentage_delta;
///
/// assert_eq!(percentage_delta(150.0, 100.0), 50.0);
/// assert_eq!(percentage_delta(42.0, 0.0), 0.0);
/// ```
pub fn percentage_delta(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// The three indicators reported by `/requests/sli`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Latency,
    ErrorRate,
    Throughput,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Self::Latency, Self::ErrorRate, Self::Throughput];

    pub fn higher_is_better(self) -> bool {
        matches!(self, Indicator::Throughput)
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::Latency => "Average latency",
            Indicator::ErrorRate => "Error rate",
            Indicator::Throughput => "Throughput",
        }
    }
}

/// Direction of a delta from the operator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improvement,
    Regression,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Improvement => "improvement",
            Trend::Regression => "regression",
            Trend::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Classify a delta for an indicator.
pub fn classify(indicator: Indicator, delta: f64) -> Trend {
    if delta == 0.0 || delta.is_nan() {
        return Trend::Neutral;
    }
    let increased = delta > 0.0;
    if increased == indicator.higher_is_better() {
        Trend::Improvement
    } else {
        Trend::Regression
    }
}

/// Percentage deltas of all three indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SliDeltas {
    pub latency: f64,
    pub error_rate: f64,
    pub throughput: f64,
}

impl SliDeltas {
    pub fn from_snapshot(snapshot: &SliSnapshot) -> Self {
        Self {
            latency: percentage_delta(snapshot.average_latency, snapshot.prev_average_latency),
            error_rate: percentage_delta(snapshot.error_rate, snapshot.prev_error_rate),
            throughput: percentage_delta(snapshot.throughput, snapshot.prev_throughput),
        }
    }

    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Latency => self.latency,
            Indicator::ErrorRate => self.error_rate,
            Indicator::Throughput => self.throughput,
        }
    }

    pub fn trend(&self, indicator: Indicator) -> Trend {
        classify(indicator, self.get(indicator))
    }
}

/// Human label for the period the current one is compared against.
pub fn comparison_label(from: DateTime<Utc>, now: DateTime<Utc>) -> &'static str {
    let hours = (now - from).num_hours().abs();
    match hours {
        h if h < 24 => "last hour",
        h if h < 48 => "yesterday",
        h if h < 72 => "2 days ago",
        _ => "last week",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_delta_zero_baseline() {
        assert_eq!(percentage_delta(0.0, 0.0), 0.0);
        assert_eq!(percentage_delta(1234.5, 0.0), 0.0);
    }

    #[test]
    fn test_delta_sign() {
        assert_eq!(percentage_delta(80.0, 100.0), -20.0);
        assert_eq!(percentage_delta(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_latency_and_error_rate_lower_is_better() {
        assert_eq!(classify(Indicator::Latency, 12.0), Trend::Regression);
        assert_eq!(classify(Indicator::Latency, -3.0), Trend::Improvement);
        assert_eq!(classify(Indicator::ErrorRate, 0.5), Trend::Regression);
    }

    #[test]
    fn test_throughput_higher_is_better() {
        assert_eq!(classify(Indicator::Throughput, 12.0), Trend::Improvement);
        assert_eq!(classify(Indicator::Throughput, -12.0), Trend::Regression);
    }

    #[test]
    fn test_zero_delta_is_neutral() {
        for indicator in Indicator::ALL {
            assert_eq!(classify(indicator, 0.0), Trend::Neutral);
        }
    }

    #[test]
    fn test_deltas_from_snapshot() {
        let snapshot = SliSnapshot {
            average_latency: 120.0,
            error_rate: 0.02,
            throughput: 5.0,
            prev_average_latency: 100.0,
            prev_error_rate: 0.0,
            prev_throughput: 10.0,
        };
        let deltas = SliDeltas::from_snapshot(&snapshot);
        assert!((deltas.latency - 20.0).abs() < 1e-9);
        assert_eq!(deltas.error_rate, 0.0);
        assert_eq!(deltas.throughput, -50.0);
        assert_eq!(deltas.trend(Indicator::Latency), Trend::Regression);
        assert_eq!(deltas.trend(Indicator::ErrorRate), Trend::Neutral);
        assert_eq!(deltas.trend(Indicator::Throughput), Trend::Regression);
    }

    #[test]
    fn test_comparison_labels() {
        let now = Utc::now();
        assert_eq!(comparison_label(now - Duration::hours(2), now), "last hour");
        assert_eq!(comparison_label(now - Duration::hours(30), now), "yesterday");
        assert_eq!(comparison_label(now - Duration::hours(50), now), "2 days ago");
        assert_eq!(comparison_label(now - Duration::hours(200), now), "last week");
    }

    #[test]
    fn test_comparison_label_boundaries() {
        let now = Utc::now();
        assert_eq!(comparison_label(now - Duration::hours(24), now), "yesterday");
        assert_eq!(comparison_label(now - Duration::minutes(47 * 60 + 59), now), "yesterday");
        assert_eq!(comparison_label(now - Duration::hours(72), now), "last week");
    }

    #[test]
    fn test_comparison_label_uses_absolute_difference() {
        let now = Utc::now();
        assert_eq!(comparison_label(now + Duration::hours(30), now), "yesterday");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the delta's sign follows the direction of change.
            #[test]
            fn prop_delta_sign_matches_direction(
                current in 0.0f64..1e6,
                previous in 0.001f64..1e6,
            ) {
                let delta = percentage_delta(current, previous);
                if current > previous {
                    prop_assert!(delta > 0.0);
                } else if current < previous {
                    prop_assert!(delta < 0.0);
                } else {
                    prop_assert_eq!(delta, 0.0);
                }
            }

            /// Property: applying the delta to the previous value recovers the current one.
            #[test]
            fn prop_delta_recovers_current(current in 0.0f64..1e6, previous in 0.001f64..1e6) {
                let delta = percentage_delta(current, previous);
                let recovered = previous * (1.0 + delta / 100.0);
                prop_assert!((recovered - current).abs() <= 1e-6 * current.max(1.0));
            }

            /// Property: a zero baseline always yields a zero delta.
            #[test]
            fn prop_zero_previous_is_zero(current in -1e6f64..1e6) {
                prop_assert_eq!(percentage_delta(current, 0.0), 0.0);
            }

            /// Property: a drop can never exceed 100 percent.
            #[test]
            fn prop_delta_bounded_below(current in 0.0f64..1e6, previous in 0.001f64..1e6) {
                prop_assert!(percentage_delta(current, previous) >= -100.0 - 1e-9);
            }

            /// Property: latency and throughput classify in opposite directions.
            #[test]
            fn prop_latency_and_throughput_disagree(delta in -1e4f64..1e4) {
                prop_assume!(delta != 0.0);
                prop_assert_ne!(
                    classify(Indicator::Latency, delta),
                    classify(Indicator::Throughput, delta)
                );
            }
        }
    }
}
