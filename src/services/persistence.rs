use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{ChatState, Gender, ParticipantId, Profile, SharedState};

/// Errors raised while reading or writing the data file. Never fatal and
/// never shown to participants; the in-memory state stays authoritative.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The durable on-disk contract. Other tooling reads this file, so the
/// field names (`partnerId`, `premiumGirlsUntil`) are part of the schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: BTreeMap<ParticipantId, Profile>,
    pub waiting: Vec<ParticipantId>,
    pub banned: Vec<ParticipantId>,
}

/// Capture the current state under the lock. The caller writes the result
/// to disk after releasing it.
pub fn snapshot(state: &ChatState) -> Snapshot {
    let users = state
        .profiles
        .iter()
        .map(|(&id, profile)| (id, profile.clone()))
        .collect();
    let mut banned: Vec<ParticipantId> = state.banned.iter().copied().collect();
    banned.sort_unstable();
    Snapshot {
        users,
        waiting: state.waiting.clone(),
        banned,
    }
}

/// Write a snapshot to `path`.
pub async fn save(path: &Path, snapshot: &Snapshot) -> Result<(), PersistenceError> {
    let json = serde_json::to_vec_pretty(snapshot)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Write-through used after every mutating handler: snapshot under the
/// lock, write outside it, log on failure and move on.
pub async fn persist(state: &SharedState, path: &Path) {
    let snap = {
        let st = state.lock().await;
        snapshot(&st)
    };
    if let Err(e) = save(path, &snap).await {
        tracing::error!("failed to write data file {}: {}", path.display(), e);
    }
}

/// Fixed-interval autosave loop; runs until the task is dropped.
pub async fn autosave(state: SharedState, path: PathBuf, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        persist(&state, &path).await;
    }
}

/// Restore state from `path`. A missing or empty file yields a fresh state;
/// a missing or malformed field on one user falls back to that field's
/// default without abandoning the rest of the load.
pub fn load(path: &Path) -> Result<ChatState, PersistenceError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("no data file at {}, starting fresh", path.display());
            return Ok(ChatState::default());
        }
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(ChatState::default());
    }

    let value: Value = serde_json::from_str(&raw)?;
    let state = state_from_value(&value);
    tracing::info!(
        "loaded {} users, {} waiting, {} banned from {}",
        state.profiles.len(),
        state.waiting.len(),
        state.banned.len(),
        path.display()
    );
    Ok(state)
}

fn state_from_value(value: &Value) -> ChatState {
    let mut state = ChatState::default();

    if let Some(users) = value.get("users").and_then(Value::as_object) {
        for (key, user) in users {
            match key.parse::<ParticipantId>() {
                Ok(id) => state.profiles.insert(id, profile_from_value(user)),
                Err(_) => tracing::warn!("skipping user with non-numeric id {:?}", key),
            }
        }
    }

    state.banned = ids_from_value(value.get("banned")).into_iter().collect();

    // Repair pairing links that only point one way before trusting them.
    let dangling: Vec<ParticipantId> = state
        .profiles
        .iter()
        .filter_map(|(&id, profile)| {
            let partner = profile.partner_id?;
            let back = state.profiles.get(partner).and_then(|p| p.partner_id);
            (back != Some(id)).then_some(id)
        })
        .collect();
    for id in dangling {
        tracing::warn!("clearing one-sided partner link on {}", id);
        state.profiles.get_or_create(id).partner_id = None;
    }

    // The queue must stay disjoint from bans and pairings, duplicate-free.
    for id in ids_from_value(value.get("waiting")) {
        if state.waiting.contains(&id) || state.is_banned(id) {
            continue;
        }
        if state.profiles.get(id).is_some_and(Profile::is_paired) {
            continue;
        }
        state.waiting.push(id);
    }

    state
}

fn profile_from_value(user: &Value) -> Profile {
    Profile {
        gender: user
            .get("gender")
            .and_then(Value::as_str)
            .map(Gender::parse_stored)
            .unwrap_or_default(),
        interests: user
            .get("interests")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        partner_id: user.get("partnerId").and_then(Value::as_i64),
        premium_until_ms: user
            .get("premiumGirlsUntil")
            .and_then(Value::as_i64)
            .unwrap_or(0),
    }
}

fn ids_from_value(value: Option<&Value>) -> Vec<ParticipantId> {
    value
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine;
    use crate::models::normalize_interests;

    #[test]
    fn test_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let state = load(&dir.path().join("data.json")).unwrap();
        assert!(state.profiles.is_empty());
        assert!(state.waiting.is_empty());
        assert!(state.banned.is_empty());
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut state = ChatState::default();
        {
            let profile = state.profiles.get_or_create(1);
            profile.gender = Gender::Girl;
            profile.interests = normalize_interests("anime, chess");
            profile.premium_until_ms = 12345;
        }
        engine::pair(&mut state, 2, 3);
        state.profiles.get_or_create(4);
        state.waiting.push(4);
        state.banned.insert(5);

        save(&path, &snapshot(&state)).await.unwrap();
        let restored = load(&path).unwrap();

        let p1 = restored.profiles.get(1).unwrap();
        assert_eq!(p1.gender, Gender::Girl);
        assert_eq!(p1.interests, normalize_interests("anime, chess"));
        assert_eq!(p1.premium_until_ms, 12345);
        assert_eq!(restored.profiles.get(2).unwrap().partner_id, Some(3));
        assert_eq!(restored.waiting, vec![4]);
        assert!(restored.is_banned(5));
    }

    #[test]
    fn test_schema_field_names() {
        let mut state = ChatState::default();
        engine::pair(&mut state, 1, 2);
        let json = serde_json::to_value(snapshot(&state)).unwrap();

        let user = &json["users"]["1"];
        assert_eq!(user["partnerId"], 2);
        assert_eq!(user["premiumGirlsUntil"], 0);
        assert_eq!(user["gender"], "unknown");
        assert!(user["interests"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_fields_fall_back_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{
                "users": {
                    "1": {"gender": 42, "interests": "oops", "partnerId": "x", "premiumGirlsUntil": 777},
                    "2": {},
                    "bogus": {"gender": "girl"}
                },
                "waiting": [1, "nope", 2],
                "banned": [9]
            }"#,
        )
        .unwrap();

        let state = load(&path).unwrap();
        // Field-level fallbacks, not a rejected user.
        let p1 = state.profiles.get(1).unwrap();
        assert_eq!(p1.gender, Gender::Unknown);
        assert!(p1.interests.is_empty());
        assert!(p1.partner_id.is_none());
        assert_eq!(p1.premium_until_ms, 777);
        // Entirely empty user record is fine too.
        assert!(state.profiles.get(2).is_some());
        // Non-numeric user key skipped, non-numeric waiting entry skipped.
        assert_eq!(state.profiles.len(), 2);
        assert_eq!(state.waiting, vec![1, 2]);
        assert!(state.is_banned(9));
    }

    #[test]
    fn test_waiting_queue_sanitized_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{
                "users": {
                    "1": {"partnerId": 2},
                    "2": {"partnerId": 1}
                },
                "waiting": [1, 3, 3, 4],
                "banned": [4]
            }"#,
        )
        .unwrap();

        let state = load(&path).unwrap();
        // Paired, duplicate and banned entries are all dropped.
        assert_eq!(state.waiting, vec![3]);
    }

    #[test]
    fn test_one_sided_partner_link_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"users": {"1": {"partnerId": 2}, "2": {}}, "waiting": [], "banned": []}"#,
        )
        .unwrap();

        let state = load(&path).unwrap();
        assert!(state.profiles.get(1).unwrap().partner_id.is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_err());
    }
}
