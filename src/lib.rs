//! kanony - Anonymous pairing and relay engine for the k-Anony chat bot
//!
//! This library matches anonymous participants into 1:1 chat sessions based
//! on declared gender and interests (plus a time-limited girl-only premium
//! filter), relays text between paired participants, and keeps all pairing
//! state consistent behind a single concurrency boundary.

pub mod config;
pub mod core;
pub mod handlers;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Settings;
pub use core::{pair, request_match, unpair};
pub use handlers::{handle_event, AppState, Flow};
pub use models::{
    AdminCommand, ChatState, Gender, InboundEvent, MatchOutcome, Profile, QueueReason,
    RelayOutcome, SharedState,
};
pub use services::{Notifier, Snapshot};
