//! Timestamp rules shared by every store.
//!
//! Timestamps are kept at microsecond precision, which is what the SQLite
//! store persists. A status change must move `updated_at` strictly forward,
//! so [`next_updated_at`] steps past the previous value when the clock has
//! not advanced.

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Drop sub-microsecond precision.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// The `updated_at` to record for a transition happening at `now`.
///
/// Always strictly greater than `previous`.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = truncate_to_micros(now);
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
