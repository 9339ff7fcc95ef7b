// Service exports
pub mod moderation;
pub mod notify;
pub mod persistence;
pub mod relay;

pub use notify::{DeliveryError, Notifier};
pub use persistence::{PersistenceError, Snapshot};
