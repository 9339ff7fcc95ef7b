use chrono::{DateTime, Utc};

use crate::core::premium;
use crate::models::{Gender, Profile};

/// Whether `candidate` is an acceptable partner for `requester`.
///
/// The only hard constraint is the requester's premium filter: while it is
/// active the candidate must be a girl. The check is directional — the
/// candidate's own premium status never restricts the requester.
#[inline]
pub fn can_match(requester: &Profile, candidate: &Profile, now: DateTime<Utc>) -> bool {
    if premium::is_active(requester, now) && candidate.gender != Gender::Girl {
        return false;
    }
    true
}
