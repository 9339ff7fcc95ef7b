// Handler exports
pub mod events;

pub use events::{handle_event, AppState, Flow};
