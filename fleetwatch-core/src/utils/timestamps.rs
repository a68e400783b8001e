use std::time::Duration;

use chrono::{DateTime, Utc};

/// Report header timestamp (YYYY-MM-DD HH:MM:SS UTC)
pub fn format_report_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Convert epoch seconds and nanoseconds into a UTC timestamp
pub fn from_epoch(secs: i64, nanos: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, nanos)
}

/// Compact elapsed time for status tables, e.g. `4m30s` or `12s`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{secs}s")
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}
