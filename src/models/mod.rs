// Model exports
pub mod domain;
pub mod events;
pub mod outcomes;
pub mod state;

pub use domain::{normalize_interests, Gender, ParticipantId, Profile};
pub use events::{AdminCommand, InboundEvent};
pub use outcomes::{BanOutcome, MatchOutcome, PairDetails, PeerInfo, QueueReason, RelayOutcome};
pub use state::{ChatState, ProfileStore, SharedState, Stats};
