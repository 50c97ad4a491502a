//! Aggregation resolutions and wall-clock alignment.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Bucket width of a history.
///
/// Alignment floors Unix time to a multiple of the width. Every width divides
/// an hour, so edges land on whole seconds, whole minutes, and multiples of
/// five minutes past the hour respectively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum Resolution {
    #[serde(rename = "1s")]
    #[strum(serialize = "1s")]
    OneSecond,
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    #[strum(serialize = "5m")]
    FiveMinutes,
}

impl Resolution {
    /// All resolutions, finest first.
    pub const ALL: [Resolution; 3] = [Self::OneSecond, Self::OneMinute, Self::FiveMinutes];

    /// Bucket width in seconds.
    pub const fn width_secs(self) -> i64 {
        match self {
            Self::OneSecond => 1,
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
        }
    }

    pub fn width(self) -> TimeDelta {
        TimeDelta::seconds(self.width_secs())
    }

    /// Human-readable label, e.g. "1-Minute".
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneSecond => "1-Second",
            Self::OneMinute => "1-Minute",
            Self::FiveMinutes => "5-Minute",
        }
    }

    /// Floor `now` to the start of the grid cell that contains it.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use proping::aggregate::Resolution;
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 47, 31).unwrap();
    /// assert_eq!(
    ///     Resolution::FiveMinutes.align(now),
    ///     Utc.with_ymd_and_hms(2024, 3, 1, 10, 45, 0).unwrap()
    /// );
    /// ```
    pub fn align(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let secs = now.timestamp();
        let excess = secs.rem_euclid(self.width_secs());
        now - TimeDelta::seconds(excess)
            - TimeDelta::nanoseconds(i64::from(now.timestamp_subsec_nanos()))
    }

    /// Start of the newest bucket a history holds at `now`.
    ///
    /// The 1s history includes the second in progress. Coarser histories end
    /// at the last completed cell, so a bucket is only shown once it is whole.
    pub fn newest_bucket_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let aligned = self.align(now);
        match self {
            Self::OneSecond => aligned,
            Self::OneMinute | Self::FiveMinutes => aligned - self.width(),
        }
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::OneSecond => 0,
            Self::OneMinute => 1,
            Self::FiveMinutes => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use std::str::FromStr;

    #[test]
    fn test_align_one_second() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 47, 31).unwrap()
            + TimeDelta::milliseconds(750);
        assert_eq!(
            Resolution::OneSecond.align(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 47, 31).unwrap()
        );
    }

    #[test]
    fn test_align_one_minute() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 47, 59).unwrap()
            + TimeDelta::milliseconds(999);
        assert_eq!(
            Resolution::OneMinute.align(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 47, 0).unwrap()
        );
    }

    #[test]
    fn test_align_is_idempotent() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        for resolution in Resolution::ALL {
            let aligned = resolution.align(now);
            assert_eq!(resolution.align(aligned), aligned);
            assert!(aligned <= now);
            assert!(now - aligned < resolution.width());
        }
    }

    #[test]
    fn test_five_minute_alignment_law() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        // Walk two days in 37-second steps to hit every minute phase.
        for step in 0..(2 * 86_400 / 37) {
            let now = start + TimeDelta::seconds(step * 37) + TimeDelta::milliseconds(step % 1000);
            let aligned = Resolution::FiveMinutes.align(now);
            assert_eq!(aligned.minute() % 5, 0, "now = {now}");
            assert_eq!(aligned.second(), 0);
            assert_eq!(aligned.nanosecond(), 0);
            assert_eq!(aligned.minute(), (now.minute() / 5) * 5);
        }
    }

    #[test]
    fn test_newest_bucket_start() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 47, 31).unwrap();
        assert_eq!(
            Resolution::OneSecond.newest_bucket_start(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 47, 31).unwrap()
        );
        assert_eq!(
            Resolution::OneMinute.newest_bucket_start(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 46, 0).unwrap()
        );
        assert_eq!(
            Resolution::FiveMinutes.newest_bucket_start(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 40, 0).unwrap()
        );
    }

    #[test]
    fn test_resolution_strings() {
        assert_eq!(Resolution::OneMinute.to_string(), "1m");
        assert_eq!(Resolution::from_str("5m").unwrap(), Resolution::FiveMinutes);
        assert!(Resolution::from_str("10m").is_err());
        assert_eq!(Resolution::OneSecond.label(), "1-Second");
    }
}
