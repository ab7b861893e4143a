use chrono::{DateTime, TimeDelta, Timelike, Utc};

/// Returns the current time, truncated to whole seconds.
#[must_use]
pub fn now() -> DateTime<Utc> {
    truncate_to_second(Utc::now())
}

/// Drops the sub-second part of a timestamp.
#[must_use]
pub fn truncate_to_second(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts - TimeDelta::nanoseconds(i64::from(ts.nanosecond()))
}

/// Drops seconds and sub-seconds of a timestamp.
#[must_use]
pub fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_second(ts) - TimeDelta::seconds(i64::from(ts.second()))
}
