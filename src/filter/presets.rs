//! Named time windows.

use chrono::{DateTime, Duration, Months, Utc};
use std::fmt;
use std::str::FromStr;

/// Quick selections for the request log's time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRangePreset {
    Today,
    PastWeek,
    PastMonth,
}

impl TimeRangePreset {
    pub const ALL: [TimeRangePreset; 3] = [Self::Today, Self::PastWeek, Self::PastMonth];

    /// `(from, to)` ending at `now`.
    pub fn range(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = match self {
            TimeRangePreset::Today => now - Duration::days(1),
            TimeRangePreset::PastWeek => now - Duration::days(7),
            TimeRangePreset::PastMonth => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
        };
        (from, now)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRangePreset::Today => "Today",
            TimeRangePreset::PastWeek => "Past week",
            TimeRangePreset::PastMonth => "Past month",
        }
    }
}

impl fmt::Display for TimeRangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "today" => Ok(Self::Today),
            "pastweek" | "week" => Ok(Self::PastWeek),
            "pastmonth" | "month" => Ok(Self::PastMonth),
            _ => Err(format!(
                "Unknown time range '{}'. Valid: today, past-week, past-month",
                s
            )),
        }
    }
}

/// Dashboard look-back windows for the aggregate endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    OneWeek,
    TwoDays,
    #[default]
    OneDay,
    OneHour,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [Self::OneWeek, Self::TwoDays, Self::OneDay, Self::OneHour];

    pub fn duration(self) -> Duration {
        match self {
            Timeframe::OneWeek => Duration::days(7),
            Timeframe::TwoDays => Duration::days(2),
            Timeframe::OneDay => Duration::days(1),
            Timeframe::OneHour => Duration::hours(1),
        }
    }

    /// Start of the window ending at `now`.
    pub fn from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneWeek => "1w",
            Timeframe::TwoDays => "2d",
            Timeframe::OneDay => "24h",
            Timeframe::OneHour => "1h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1w" => Ok(Self::OneWeek),
            "2d" => Ok(Self::TwoDays),
            "24h" | "1d" => Ok(Self::OneDay),
            "1h" => Ok(Self::OneHour),
            _ => Err(format!("Unknown timeframe '{}'. Valid: 1w, 2d, 24h, 1h", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_preset_ranges() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(TimeRangePreset::Today.range(now).0, now - Duration::days(1));
        assert_eq!(TimeRangePreset::PastWeek.range(now).0, now - Duration::days(7));
        assert_eq!(
            TimeRangePreset::PastMonth.range(now).0,
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
        );
        assert_eq!(TimeRangePreset::Today.range(now).1, now);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("past-week".parse::<TimeRangePreset>(), Ok(TimeRangePreset::PastWeek));
        assert_eq!("Today".parse::<TimeRangePreset>(), Ok(TimeRangePreset::Today));
        assert!("yesterday".parse::<TimeRangePreset>().is_err());
    }

    #[test]
    fn test_timeframe_windows() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(Timeframe::OneWeek.from(now), now - Duration::days(7));
        assert_eq!(Timeframe::OneHour.from(now), now - Duration::hours(1));
        assert_eq!(Timeframe::default(), Timeframe::OneDay);
        assert_eq!("2d".parse::<Timeframe>(), Ok(Timeframe::TwoDays));
    }
}
