use chrono::{DateTime, Utc};

use crate::core::{filters, scoring};
use crate::models::{
    ChatState, MatchOutcome, PairDetails, ParticipantId, PeerInfo, Profile, QueueReason,
};

/// Try to find a partner for `id`, pairing on success or queueing otherwise.
///
/// The scan walks the waiting queue in order and keeps the eligible
/// candidate with the strictly highest shared-interest score, so ties go to
/// whoever queued first. Banned entries are skipped even if moderation
/// failed to dequeue them.
pub fn request_match(state: &mut ChatState, id: ParticipantId, now: DateTime<Utc>) -> MatchOutcome {
    if state.is_banned(id) {
        return MatchOutcome::Banned;
    }

    let requester = state.profiles.get_or_create(id).clone();
    if requester.is_paired() {
        return MatchOutcome::AlreadyPaired;
    }

    // Defensive de-dup: a repeated start must not leave two queue entries.
    state.remove_from_waiting(id);

    if state.waiting.is_empty() {
        state.waiting.push(id);
        return MatchOutcome::Queued(QueueReason::EmptyQueue);
    }

    let default_profile = Profile::default();
    let mut best: Option<ParticipantId> = None;
    let mut best_score: i64 = -1;

    for &other in &state.waiting {
        if other == id || state.is_banned(other) {
            continue;
        }
        let candidate = state.profiles.get(other).unwrap_or(&default_profile);
        if !filters::can_match(&requester, candidate, now) {
            continue;
        }
        let score = scoring::interest_overlap(&requester, candidate) as i64;
        if score > best_score {
            best_score = score;
            best = Some(other);
        }
    }

    match best {
        None => {
            state.waiting.push(id);
            MatchOutcome::Queued(QueueReason::NoSuitableMatch)
        }
        Some(candidate) => {
            state.remove_from_waiting(candidate);
            MatchOutcome::Paired(pair(state, id, candidate))
        }
    }
}

/// Link `a` and `b` as partners in one critical section and report the
/// details both sides need to be notified.
///
/// Callers must have unpaired both participants first; pairing over an
/// existing link would strand the old partners half-linked.
pub fn pair(state: &mut ChatState, a: ParticipantId, b: ParticipantId) -> PairDetails {
    debug_assert!(!state.profiles.get_or_create(a).is_paired());
    debug_assert!(!state.profiles.get_or_create(b).is_paired());

    state.profiles.get_or_create(a).partner_id = Some(b);
    state.profiles.get_or_create(b).partner_id = Some(a);

    let profile_a = state.profiles.get_or_create(a).clone();
    let profile_b = state.profiles.get_or_create(b).clone();

    PairDetails {
        shared: scoring::shared_interests(&profile_a, &profile_b),
        a: PeerInfo {
            id: a,
            gender: profile_a.gender,
            interests: profile_a.interests.into_iter().collect(),
        },
        b: PeerInfo {
            id: b,
            gender: profile_b.gender,
            interests: profile_b.interests.into_iter().collect(),
        },
    }
}

/// Clear the pairing for `id`, both sides at once. Returns the former
/// partner so the caller can decide whether to notify or re-queue; no-op
/// when `id` has no partner. Never re-queues either party.
pub fn unpair(state: &mut ChatState, id: ParticipantId) -> Option<ParticipantId> {
    let partner = state.profiles.get(id).and_then(|p| p.partner_id)?;
    state.profiles.get_or_create(id).partner_id = None;
    state.profiles.get_or_create(partner).partner_id = None;
    Some(partner)
}
