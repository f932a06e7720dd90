//! Calendar helpers for day-sharded storage
//!
//! All derivations operate on UTC unix seconds: a series shard is addressed
//! by its epoch day, a sample within the shard by its minute of day.

use chrono::{DateTime, Utc};

/// Seconds in one UTC day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds in one minute
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Epoch day of a timestamp: unix seconds floor-divided by 86400
pub fn unix_day(secs: i64) -> i64 {
    secs.div_euclid(SECONDS_PER_DAY)
}

/// Minute of day of a timestamp, always in `[0, 1439]`
pub fn minute_of_day(secs: i64) -> i64 {
    secs.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_MINUTE
}

/// Midnight UTC of the given epoch day, in unix seconds
pub fn day_start(unix_day: i64) -> i64 {
    unix_day.saturating_mul(SECONDS_PER_DAY)
}

/// Truncate a timestamp down to a multiple of `step` seconds since the
/// unix epoch. Buckets produced this way are UTC-aligned.
pub fn truncate(secs: i64, step: i64) -> i64 {
    secs - secs.rem_euclid(step)
}

/// Convert unix seconds to a UTC datetime, saturating at chrono's
/// representable range.
pub(crate) fn to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(if secs < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_day() {
        assert_eq!(unix_day(0), 0);
        assert_eq!(unix_day(1414141414), 16367);
        assert_eq!(unix_day(1414108800), 16367); // midnight
        assert_eq!(unix_day(1414108799), 16366);
        assert_eq!(unix_day(-1), -1); // floor, not truncation
    }

    #[test]
    fn test_minute_of_day() {
        assert_eq!(minute_of_day(1414141414), 543);
        assert_eq!(minute_of_day(1414108800), 0);
        assert_eq!(minute_of_day(1414108800 + 86399), 1439);
        assert!(minute_of_day(-1) >= 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(1414141414, 60), 1414141380);
        assert_eq!(truncate(1414141414, 3600), 1414141200);
        assert_eq!(truncate(1414141200, 3600), 1414141200);
    }

    #[test]
    fn test_day_start_round_trip() {
        assert_eq!(day_start(16367), 1414108800);
        assert_eq!(unix_day(day_start(16367)), 16367);
    }

    #[test]
    fn test_to_datetime_saturates() {
        assert_eq!(to_datetime(1414141414).timestamp(), 1414141414);
        assert_eq!(to_datetime(i64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(to_datetime(i64::MIN), DateTime::<Utc>::MIN_UTC);
    }
}
