use chrono::{DateTime, Utc};

use crate::models::Profile;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Whether the girl-only premium filter is active at `now`.
#[inline]
pub fn is_active(profile: &Profile, now: DateTime<Utc>) -> bool {
    profile.premium_until_ms > now.timestamp_millis()
}

/// Grant (or re-grant) premium for `duration_hours` from `now`. Overwrites
/// any existing deadline; grants do not stack.
pub fn grant(profile: &mut Profile, now: DateTime<Utc>, duration_hours: i64) {
    profile.premium_until_ms = now.timestamp_millis() + duration_hours * MS_PER_HOUR;
}

/// Remaining premium time in whole hours, rounded up for display. Zero means
/// inactive.
pub fn remaining_hours(profile: &Profile, now: DateTime<Utc>) -> i64 {
    let remaining_ms = profile.premium_until_ms - now.timestamp_millis();
    if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms + MS_PER_HOUR - 1) / MS_PER_HOUR
    }
}
