use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable platform-assigned participant identifier.
pub type ParticipantId = i64;

/// Self-declared gender. Stored as-is; never verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unknown,
    Girl,
    Boy,
    Other,
}

impl Gender {
    /// Parse a command argument, accepting the short and English aliases.
    pub fn parse_command(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "girl" | "g" | "female" | "f" => Some(Gender::Girl),
            "boy" | "b" | "male" | "m" => Some(Gender::Boy),
            "other" | "o" | "any" => Some(Gender::Other),
            _ => None,
        }
    }

    /// Parse a stored value, falling back to `Unknown` on anything odd.
    pub fn parse_stored(raw: &str) -> Self {
        match raw {
            "girl" => Gender::Girl,
            "boy" => Gender::Boy,
            "other" => Gender::Other,
            _ => Gender::Unknown,
        }
    }

    /// Wire value used in the persisted snapshot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Unknown => "unknown",
            Gender::Girl => "girl",
            Gender::Boy => "boy",
            Gender::Other => "other",
        }
    }

    /// How a partner is described to the other side of a pairing.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Girl => "girl",
            Gender::Boy => "boy",
            Gender::Unknown | Gender::Other => "person",
        }
    }
}

/// Per-participant record. Created lazily on first interaction and kept for
/// the lifetime of the bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(rename = "partnerId", default)]
    pub partner_id: Option<ParticipantId>,
    /// Girl-only premium deadline, ms since epoch. 0 means never granted.
    #[serde(rename = "premiumGirlsUntil", default)]
    pub premium_until_ms: i64,
}

impl Profile {
    pub fn is_paired(&self) -> bool {
        self.partner_id.is_some()
    }
}

/// Normalize a raw interest string into the stored token set: lowercase,
/// split on commas, newlines and whitespace, empty pieces dropped.
pub fn normalize_interests(raw: &str) -> BTreeSet<String> {
    raw.to_lowercase()
        .split([',', '\n'])
        .flat_map(str::split_whitespace)
        .map(str::to_owned)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_command_aliases() {
        assert_eq!(Gender::parse_command("girl"), Some(Gender::Girl));
        assert_eq!(Gender::parse_command("F"), Some(Gender::Girl));
        assert_eq!(Gender::parse_command(" male "), Some(Gender::Boy));
        assert_eq!(Gender::parse_command("any"), Some(Gender::Other));
        assert_eq!(Gender::parse_command("robot"), None);
    }

    #[test]
    fn test_gender_stored_fallback() {
        assert_eq!(Gender::parse_stored("girl"), Gender::Girl);
        assert_eq!(Gender::parse_stored("whatever"), Gender::Unknown);
    }

    #[test]
    fn test_normalize_interests() {
        let set = normalize_interests("Roblox, anime  gaming,\nANIME");
        let tokens: Vec<_> = set.iter().cloned().collect();
        assert_eq!(tokens, vec!["anime", "gaming", "roblox"]);
    }

    #[test]
    fn test_normalize_interests_empty() {
        assert!(normalize_interests("  , ,\n ").is_empty());
    }

    #[test]
    fn test_default_profile() {
        let p = Profile::default();
        assert_eq!(p.gender, Gender::Unknown);
        assert!(p.interests.is_empty());
        assert!(p.partner_id.is_none());
        assert_eq!(p.premium_until_ms, 0);
    }
}
