use async_trait::async_trait;
use thiserror::Error;

use crate::models::ParticipantId;

/// Errors raised by the outbound messaging capability.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("recipient {0} is unreachable")]
    Unreachable(ParticipantId),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Deliver-text-to-participant capability supplied by the messaging layer.
///
/// Implementations may fail per recipient; callers decide what a failure
/// means (relay unpairs, broadcasts just count). Failures never propagate
/// past the relay/pairing boundary.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, to: ParticipantId, text: &str) -> Result<(), DeliveryError>;
}

/// Send `text` to `to`, logging and swallowing any failure. Used for the
/// fire-and-forget side of pairing and moderation notices, where the
/// recipient being unreachable changes nothing.
pub async fn deliver_best_effort(notifier: &dyn Notifier, to: ParticipantId, text: &str) {
    if let Err(e) = notifier.deliver(to, text).await {
        tracing::warn!("dropped notification to {}: {}", to, e);
    }
}
