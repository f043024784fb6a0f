/// Feed sample staleness detection.
///
/// SWPC real-time products refresh every one to fifteen minutes. A feed whose
/// latest sample is hours old usually means an upstream outage that is not
/// obvious from the numbers alone, so services log a warning for it.
///
/// # Clock injection
/// `is_stale_at` takes `now` rather than calling `Utc::now()`, which keeps
/// staleness deterministic in tests.

use chrono::{DateTime, Utc};

use crate::model::TimePoint;

/// Returns `true` if the sample is older than `max_age_minutes` relative to
/// `now`.
///
/// Staleness is strictly greater than the threshold:
///   age > max_age_minutes  →  stale
///   age == max_age_minutes →  not stale
///
/// A sample without a timestamp is stale.
pub fn is_stale_at(point: &TimePoint, max_age_minutes: u64, now: DateTime<Utc>) -> bool {
    let Some(timestamp) = point.timestamp else {
        return true;
    };
    let age_minutes = (now - timestamp).num_minutes();
    age_minutes > 0 && age_minutes as u64 > max_age_minutes
}

/// Convenience wrapper that uses the real current time.
pub fn is_stale(point: &TimePoint, max_age_minutes: u64) -> bool {
    is_stale_at(point, max_age_minutes, Utc::now())
}
