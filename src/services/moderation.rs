use crate::core::engine;
use crate::models::{BanOutcome, ChatState, PairDetails, ParticipantId};

/// Ban a participant: exclude it from matching and messaging, break any
/// current pairing and pull it out of the waiting queue. The abandoned
/// partner is returned so the caller can notify them.
pub fn ban(state: &mut ChatState, id: ParticipantId) -> BanOutcome {
    state.banned.insert(id);
    let displaced_partner = engine::unpair(state, id);
    let removed_from_queue = state.remove_from_waiting(id);
    tracing::info!(
        "banned {} (displaced partner: {:?}, dequeued: {})",
        id,
        displaced_partner,
        removed_from_queue
    );
    BanOutcome {
        displaced_partner,
        removed_from_queue,
    }
}

/// Lift a ban. Idempotent; does not restore queue membership.
pub fn unban(state: &mut ChatState, id: ParticipantId) -> bool {
    let was_banned = state.banned.remove(&id);
    if was_banned {
        tracing::info!("unbanned {}", id);
    }
    was_banned
}

/// Administrative pairing override: both participants are torn out of any
/// existing pairing and the waiting queue, then paired unconditionally.
/// Eligibility and ban checks are bypassed on purpose — admin authority.
/// Displaced partners are returned for notification.
pub fn force_pair(
    state: &mut ChatState,
    a: ParticipantId,
    b: ParticipantId,
) -> (PairDetails, Vec<ParticipantId>) {
    let mut displaced = Vec::new();
    displaced.extend(engine::unpair(state, a));
    displaced.extend(engine::unpair(state, b));
    state.remove_from_waiting(a);
    state.remove_from_waiting(b);

    let details = engine::pair(state, a, b);
    tracing::info!("force-paired {} and {} (displaced: {:?})", a, b, displaced);
    (details, displaced)
}
