//! # Time Utilities
//!
//! Utilities for time formatting using chrono.

use chrono::{DateTime, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format time as RFC3339 string.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Current time as seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    // Negative only if the clock is set before 1970.
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}
