use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

// Fast path: returns 0 on any error instead of double error handling
#[inline]
pub fn get_current_time_or_zero() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Wall-clock timestamp stamped on marker records.
#[inline]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
