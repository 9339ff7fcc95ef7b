use crate::models::{Gender, ParticipantId};

/// Result of a match request. Callers decide the user-facing messaging from
/// the variant; no outcome is ever silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Requester is banned; nothing changed.
    Banned,
    /// Requester already has a partner; nothing changed.
    AlreadyPaired,
    /// Requester was appended to the waiting queue.
    Queued(QueueReason),
    /// Requester was paired with a queued candidate.
    Paired(PairDetails),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueReason {
    /// Nobody else was waiting.
    EmptyQueue,
    /// Others were waiting but none passed the eligibility filter.
    NoSuitableMatch,
}

/// One side of a freshly created pairing, as seen by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: ParticipantId,
    pub gender: Gender,
    pub interests: Vec<String>,
}

/// Everything a caller needs to announce a new pairing to both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairDetails {
    pub a: PeerInfo,
    pub b: PeerInfo,
    /// Interest tokens present on both sides.
    pub shared: Vec<String>,
}

impl PairDetails {
    /// The peer opposite `id`, for formatting that side's notification.
    pub fn partner_of(&self, id: ParticipantId) -> &PeerInfo {
        if self.a.id == id {
            &self.b
        } else {
            &self.a
        }
    }
}

/// Result of relaying one text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Sender is banned from messaging.
    Banned,
    /// Sender has no partner yet; nothing was sent.
    NoPartner,
    /// Message reached the partner.
    Delivered,
    /// Delivery failed; both sides were unpaired and the former partner was
    /// left un-notified (it is unreachable by definition).
    DeliveryFailed { former_partner: ParticipantId },
}

/// Result of banning a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanOutcome {
    /// Partner abandoned by the ban, to be notified by the caller.
    pub displaced_partner: Option<ParticipantId>,
    /// Whether the participant was pulled out of the waiting queue.
    pub removed_from_queue: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_of_picks_opposite_side() {
        let details = PairDetails {
            a: PeerInfo {
                id: 1,
                gender: Gender::Girl,
                interests: vec![],
            },
            b: PeerInfo {
                id: 2,
                gender: Gender::Boy,
                interests: vec![],
            },
            shared: vec![],
        };
        assert_eq!(details.partner_of(1).id, 2);
        assert_eq!(details.partner_of(2).id, 1);
    }
}
