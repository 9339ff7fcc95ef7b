use crate::core::engine;
use crate::models::{ParticipantId, RelayOutcome, SharedState};
use crate::services::notify::Notifier;

/// Forward one text message from `sender` to its partner.
///
/// The partner lookup is its own critical section; the delivery attempt runs
/// with the lock released so a slow or dead recipient never blocks other
/// participants. On delivery failure both sides are unpaired in a second
/// transaction and the unreachable partner gets no notification — callers
/// should silently re-enter matching for the sender.
pub async fn relay(
    state: &SharedState,
    notifier: &dyn Notifier,
    sender: ParticipantId,
    body: &str,
) -> RelayOutcome {
    let partner = {
        let mut st = state.lock().await;
        if st.is_banned(sender) {
            return RelayOutcome::Banned;
        }
        match st.profiles.get_or_create(sender).partner_id {
            None => return RelayOutcome::NoPartner,
            Some(partner) => partner,
        }
    };

    match notifier.deliver(partner, body).await {
        Ok(()) => RelayOutcome::Delivered,
        Err(e) => {
            tracing::info!("delivery to {} failed ({}), unpairing {}", partner, e, sender);
            let former = {
                let mut st = state.lock().await;
                engine::unpair(&mut st, sender)
            };
            RelayOutcome::DeliveryFailed {
                former_partner: former.unwrap_or(partner),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine;
    use crate::models::ChatState;
    use crate::services::notify::DeliveryError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(ParticipantId, String)>>,
        failing: Mutex<HashSet<ParticipantId>>,
    }

    impl RecordingNotifier {
        fn fail_for(&self, id: ParticipantId) {
            self.failing.lock().unwrap().insert(id);
        }

        fn sent_to(&self, id: ParticipantId) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(to, _)| *to == id)
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, to: ParticipantId, text: &str) -> Result<(), DeliveryError> {
            if self.failing.lock().unwrap().contains(&to) {
                return Err(DeliveryError::Unreachable(to));
            }
            self.sent.lock().unwrap().push((to, text.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_partner() {
        let state = ChatState::default().shared();
        let notifier = RecordingNotifier::default();
        assert_eq!(
            relay(&state, &notifier, 1, "hi").await,
            RelayOutcome::NoPartner
        );
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_banned_sender() {
        let state = ChatState::default().shared();
        state.lock().await.banned.insert(1);
        let notifier = RecordingNotifier::default();
        assert_eq!(relay(&state, &notifier, 1, "hi").await, RelayOutcome::Banned);
    }

    #[tokio::test]
    async fn test_delivered_to_partner() {
        let state = ChatState::default().shared();
        {
            let mut st = state.lock().await;
            engine::pair(&mut st, 1, 2);
        }
        let notifier = RecordingNotifier::default();

        assert_eq!(
            relay(&state, &notifier, 1, "hello").await,
            RelayOutcome::Delivered
        );
        assert_eq!(notifier.sent_to(2), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_failure_unpairs_both_sides() {
        let state = ChatState::default().shared();
        {
            let mut st = state.lock().await;
            engine::pair(&mut st, 1, 2);
        }
        let notifier = RecordingNotifier::default();
        notifier.fail_for(2);

        assert_eq!(
            relay(&state, &notifier, 1, "hello").await,
            RelayOutcome::DeliveryFailed { former_partner: 2 }
        );

        let st = state.lock().await;
        assert!(st.profiles.get(1).unwrap().partner_id.is_none());
        assert!(st.profiles.get(2).unwrap().partner_id.is_none());
        // The unreachable side received nothing.
        drop(st);
        assert!(notifier.sent_to(2).is_empty());
    }
}
