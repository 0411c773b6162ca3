//! Per-guild reaction data model.
//!
//! [`ReactionMap`] keeps emoji entries and their trigger words in insertion
//! order. The order is load-bearing: the matcher walks it front to back and
//! the first hit wins, so it survives persistence unchanged.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serenity::model::id::RoleId;

/// One emoji and the words that trigger it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEntry {
    pub emoji: String,
    /// Lower-cased, unique, insertion ordered. Never empty.
    pub words: Vec<String>,
}

/// Ordered mapping of emoji token to trigger words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionMap {
    entries: Vec<ReactionEntry>,
}

impl ReactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct emoji entries.
    #[cfg(test)]
    pub fn emoji_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ReactionEntry> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn contains(&self, emoji: &str, word: &str) -> bool {
        let word = word.to_lowercase();
        self.get(emoji).is_some_and(|entry| entry.words.contains(&word))
    }

    #[cfg(test)]
    pub fn get(&self, emoji: &str) -> Option<&ReactionEntry> {
        self.entries.iter().find(|entry| entry.emoji == emoji)
    }

    /// Insert `word` under `emoji`. Returns false if the pair already existed.
    pub fn insert(&mut self, emoji: &str, word: &str) -> bool {
        let word = word.to_lowercase();

        match self.entries.iter_mut().find(|entry| entry.emoji == emoji) {
            Some(entry) if entry.words.contains(&word) => false,
            Some(entry) => {
                entry.words.push(word);
                true
            }
            None => {
                self.entries.push(ReactionEntry {
                    emoji: emoji.to_string(),
                    words: vec![word],
                });
                true
            }
        }
    }

    /// Remove `word` from `emoji`, dropping the entry once it has no words.
    /// Returns false if the pair did not exist.
    pub fn remove(&mut self, emoji: &str, word: &str) -> bool {
        let word = word.to_lowercase();

        let Some(index) = self.entries.iter().position(|entry| entry.emoji == emoji) else {
            return false;
        };

        let entry = &mut self.entries[index];
        let Some(word_index) = entry.words.iter().position(|w| *w == word) else {
            return false;
        };

        entry.words.remove(word_index);
        if entry.words.is_empty() {
            self.entries.remove(index);
        }
        true
    }

    /// Keep only emoji entries for which `keep` returns true.
    /// Returns the removed emoji tokens in registry order.
    pub fn retain_emojis<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            if keep(&entry.emoji) {
                true
            } else {
                removed.push(entry.emoji.clone());
                false
            }
        });
        removed
    }

    /// Flattened `(emoji, word)` pairs, grouped by emoji in registry order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .words
                    .iter()
                    .map(move |word| (entry.emoji.clone(), word.clone()))
            })
            .collect()
    }
}

impl Serialize for ReactionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.emoji, &entry.words)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ReactionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ReactionMapVisitor)
    }
}

struct ReactionMapVisitor;

impl<'de> Visitor<'de> for ReactionMapVisitor {
    type Value = ReactionMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of emoji to trigger word lists")
    }

    // Entries are re-inserted one by one so that documents written by hand
    // still satisfy the lower-case, unique, non-empty invariants.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = ReactionMap::new();
        while let Some((emoji, words)) = access.next_entry::<String, Vec<String>>()? {
            for word in words {
                map.insert(&emoji, &word);
            }
        }
        Ok(map)
    }
}

/// Everything persisted for one guild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildReactionConfig {
    #[serde(default)]
    pub reactions: ReactionMap,
    #[serde(default)]
    pub react_role: Option<u64>,
}

impl GuildReactionConfig {
    pub fn role_restriction(&self) -> Option<RoleId> {
        self.react_role.filter(|id| *id != 0).map(RoleId::new)
    }

    pub fn set_role_restriction(&mut self, role: Option<RoleId>) {
        self.react_role = role.map(|id| id.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_lowercases_and_dedups() {
        let mut map = ReactionMap::new();
        assert!(map.insert("🍕", "Pizza"));
        assert!(!map.insert("🍕", "PIZZA"));
        assert!(map.contains("🍕", "pizza"));
        assert_eq!(map.pairs(), vec![("🍕".to_string(), "pizza".to_string())]);
    }

    #[test]
    fn test_remove_last_word_drops_emoji() {
        let mut map = ReactionMap::new();
        map.insert("🍕", "pizza");
        map.insert("🍕", "slice");

        assert!(map.remove("🍕", "pizza"));
        assert_eq!(map.emoji_count(), 1);
        assert!(map.remove("🍕", "SLICE"));
        assert!(map.is_empty());
        assert!(map.get("🍕").is_none());
        assert!(!map.remove("🍕", "slice"));
    }

    #[test]
    fn test_pairs_grouped_by_emoji_in_insertion_order() {
        let mut map = ReactionMap::new();
        map.insert("🎉", "party");
        map.insert("🍕", "pizza");
        map.insert("🎉", "celebrate");

        assert_eq!(
            map.pairs(),
            vec![
                ("🎉".to_string(), "party".to_string()),
                ("🎉".to_string(), "celebrate".to_string()),
                ("🍕".to_string(), "pizza".to_string()),
            ]
        );
    }

    #[test]
    fn test_retain_emojis_reports_removed() {
        let mut map = ReactionMap::new();
        map.insert("<:dead:1>", "rip");
        map.insert("🍕", "pizza");
        map.insert("<:gone:2>", "bye");

        let removed = map.retain_emojis(|emoji| !emoji.starts_with('<'));
        assert_eq!(removed, vec!["<:dead:1>".to_string(), "<:gone:2>".to_string()]);
        assert_eq!(map.pairs(), vec![("🍕".to_string(), "pizza".to_string())]);
    }

    #[test]
    fn test_serde_preserves_document_order() {
        let json = r#"{"reactions":{"🎉":["party"],"🍕":["pizza","slice"],"🍩":["donut"]},"react_role":42}"#;
        let config: GuildReactionConfig = serde_json::from_str(json).unwrap();

        let emojis: Vec<&str> = config.reactions.entries().map(|e| e.emoji.as_str()).collect();
        assert_eq!(emojis, vec!["🎉", "🍕", "🍩"]);
        assert_eq!(config.role_restriction(), Some(RoleId::new(42)));

        let written = serde_json::to_string(&config).unwrap();
        assert_eq!(written, json);
    }

    #[test]
    fn test_serde_defaults_missing_fields() {
        let config: GuildReactionConfig = serde_json::from_str("{}").unwrap();
        assert!(config.reactions.is_empty());
        assert_eq!(config.role_restriction(), None);
    }

    #[test]
    fn test_deserialize_normalizes_hand_written_entries() {
        let json = r#"{"reactions":{"🍕":["Pizza","pizza"],"🎉":[]}}"#;
        let config: GuildReactionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.reactions.pairs(), vec![("🍕".to_string(), "pizza".to_string())]);
    }
}
