use serde::{Deserialize, Serialize};

use crate::models::ParticipantId;

/// An inbound event from the messaging layer, already stripped of any
/// platform framing. Every event carries the originating participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Participant wants a partner.
    Start { from: ParticipantId },
    /// Skip the current partner and look for a new one.
    Next { from: ParticipantId },
    /// End the chat without re-entering the queue.
    Stop { from: ParticipantId },
    /// Set self-declared gender; `value` is the raw command argument.
    SetGender { from: ParticipantId, value: String },
    /// Replace the interest set; `raw` is the unparsed tag list.
    SetInterests { from: ParticipantId, raw: String },
    /// Read-only profile summary.
    ViewProfile { from: ParticipantId },
    /// A chat message to relay to the partner.
    Text { from: ParticipantId, body: String },
    /// The payment provider confirmed a premium purchase.
    PremiumPurchased { from: ParticipantId },
    /// Administrative command; authorization is checked at dispatch.
    Admin {
        from: ParticipantId,
        command: AdminCommand,
    },
}

impl InboundEvent {
    pub fn from(&self) -> ParticipantId {
        match self {
            InboundEvent::Start { from }
            | InboundEvent::Next { from }
            | InboundEvent::Stop { from }
            | InboundEvent::SetGender { from, .. }
            | InboundEvent::SetInterests { from, .. }
            | InboundEvent::ViewProfile { from }
            | InboundEvent::Text { from, .. }
            | InboundEvent::PremiumPurchased { from }
            | InboundEvent::Admin { from, .. } => *from,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AdminCommand {
    Stats,
    ListWaiting,
    ListUsers,
    Ban { id: ParticipantId },
    Unban { id: ParticipantId },
    ForcePair { a: ParticipantId, b: ParticipantId },
    Broadcast { text: String },
    Export,
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type":"text","from":42,"body":"hi"}"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::Text {
                from: 42,
                body: "hi".to_string()
            }
        );
        assert_eq!(event.from(), 42);
    }

    #[test]
    fn test_admin_wire_format() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"admin","from":1,"command":{"op":"force_pair","a":5,"b":6}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::Admin {
                from: 1,
                command: AdminCommand::ForcePair { a: 5, b: 6 }
            }
        );
    }
}
