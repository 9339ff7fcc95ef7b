use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::models::{Gender, ParticipantId, Profile};

/// Owns every profile record. Callers always go through `get_or_create`;
/// profiles are never deleted.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<ParticipantId, Profile>,
}

impl ProfileStore {
    pub fn get_or_create(&mut self, id: ParticipantId) -> &mut Profile {
        self.profiles.entry(id).or_default()
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Profile> {
        self.profiles.get(&id)
    }

    pub fn set_gender(&mut self, id: ParticipantId, gender: Gender) {
        self.get_or_create(id).gender = gender;
    }

    /// Replaces the whole interest set; not a merge.
    pub fn set_interests(&mut self, id: ParticipantId, interests: BTreeSet<String>) {
        self.get_or_create(id).interests = interests;
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &Profile)> {
        self.profiles.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.profiles.keys().copied()
    }

    pub fn insert(&mut self, id: ParticipantId, profile: Profile) {
        self.profiles.insert(id, profile);
    }
}

/// The whole mutable state of the engine: profiles, waiting queue and ban
/// set. Lives behind a single mutex so every inbound-event transaction sees
/// a consistent pairing relation.
///
/// Invariants:
/// - pairing is symmetric: `a.partner_id == Some(b)` iff `b.partner_id == Some(a)`
/// - `waiting` holds no duplicates, no paired ids and no banned ids
#[derive(Debug, Default)]
pub struct ChatState {
    pub profiles: ProfileStore,
    pub waiting: Vec<ParticipantId>,
    pub banned: HashSet<ParticipantId>,
}

/// Shared handle to the state aggregate. Handlers take the lock once per
/// transaction; network I/O happens only after it is released.
pub type SharedState = Arc<Mutex<ChatState>>;

impl ChatState {
    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn is_banned(&self, id: ParticipantId) -> bool {
        self.banned.contains(&id)
    }

    /// Idempotent removal from the waiting queue.
    pub fn remove_from_waiting(&mut self, id: ParticipantId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|&w| w != id);
        self.waiting.len() != before
    }

    pub fn stats(&self) -> Stats {
        let partnered = self
            .profiles
            .iter()
            .filter(|(_, p)| p.is_paired())
            .count();
        Stats {
            users: self.profiles.len(),
            waiting: self.waiting.len(),
            paired: partnered / 2,
            banned: self.banned.len(),
        }
    }
}

/// Counters shown by the admin stats command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub users: usize,
    pub waiting: usize,
    pub paired: usize,
    pub banned: usize,
}
