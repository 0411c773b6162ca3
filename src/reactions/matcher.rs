//! Trigger word matching.
//!
//! A trigger fires when the word appears in the message as a whole word:
//! case-insensitive, and bounded on both sides by a non-word character or
//! the edge of the text. Trigger words are matched literally, so regex
//! metacharacters in a word carry no special meaning.

use fancy_regex::Regex;
use tracing::{debug, warn};

use crate::reactions::model::ReactionMap;

/// Build the whole-word pattern for a trigger word.
pub fn trigger_pattern(word: &str) -> Result<Regex, fancy_regex::Error> {
    Regex::new(&format!(r"(?i)(?<!\w){}(?!\w)", fancy_regex::escape(word)))
}

/// Check whether `word` occurs in `text` as a whole word.
pub fn matches_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }

    match trigger_pattern(word) {
        Ok(pattern) => pattern.is_match(text).unwrap_or_else(|e| {
            warn!("Trigger match error for word '{}': {}", word, e);
            false
        }),
        Err(e) => {
            warn!("Could not build trigger pattern for word '{}': {}", word, e);
            false
        }
    }
}

/// Find the emoji to react with, if any trigger fires.
///
/// Emoji entries are visited in registry order and their words in insertion
/// order; the first pair that matches wins. Only the emoji is returned.
pub fn find_match<'a>(text: &str, reactions: &'a ReactionMap) -> Option<&'a str> {
    for entry in reactions.entries() {
        for word in &entry.words {
            if matches_word(text, word) {
                debug!("Trigger '{}' matched, reacting with {}", word, entry.emoji);
                return Some(entry.emoji.as_str());
            }
        }
    }
    None
}

/// Whether the text carries a scheme-prefixed link (`http://` or `https://`
/// followed by at least one non-space character).
pub fn contains_url(text: &str) -> bool {
    text.split_whitespace().any(|token| {
        ["http://", "https://"].iter().any(|scheme| {
            token
                .match_indices(scheme)
                .any(|(start, _)| start + scheme.len() < token.len())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(&str, &[&str])]) -> ReactionMap {
        let mut map = ReactionMap::new();
        for (emoji, words) in entries {
            for word in *words {
                map.insert(emoji, word);
            }
        }
        map
    }

    #[test]
    fn test_whole_word_match() {
        let map = registry(&[("🍕", &["pizza"])]);
        assert_eq!(find_match("I love pizza!", &map), Some("🍕"));
        assert_eq!(find_match("pizzazz", &map), None);
        assert_eq!(find_match("deep-dish-pizza", &map), Some("🍕"));
        assert_eq!(find_match("", &map), None);
    }

    #[test]
    fn test_case_insensitive() {
        let map = registry(&[("🍕", &["Pizza"])]);
        assert_eq!(find_match("PIZZA time", &map), Some("🍕"));
    }

    #[test]
    fn test_first_registered_emoji_wins() {
        let map = registry(&[("🍕", &["pizza"]), ("🎉", &["party"])]);
        for _ in 0..10 {
            assert_eq!(find_match("pizza party", &map), Some("🍕"));
            assert_eq!(find_match("party pizza", &map), Some("🍕"));
        }
        assert_eq!(find_match("party time", &map), Some("🎉"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let map = registry(&[("➕", &["c++"]), ("❓", &["a.b"])]);
        assert_eq!(find_match("I write c++ daily", &map), Some("➕"));
        assert_eq!(find_match("axb", &map), None);
        assert_eq!(find_match("see a.b now", &map), Some("❓"));
    }

    #[test]
    fn test_multi_word_trigger() {
        assert!(matches_word("good morning everyone", "good morning"));
        assert!(!matches_word("goodmorning", "good morning"));
    }

    #[test]
    fn test_unicode_word_boundaries() {
        assert!(matches_word("ça va café?", "café"));
        assert!(!matches_word("cafés", "café"));
    }

    #[test]
    fn test_empty_word_never_matches() {
        assert!(!matches_word("anything", ""));
    }

    #[test]
    fn test_contains_url() {
        assert!(contains_url("check http://example.com pizza"));
        assert!(contains_url("https://x"));
        assert!(contains_url("see(https://example.com)"));
        assert!(!contains_url("http:// pizza"));
        assert!(!contains_url("pizza time"));
        assert!(!contains_url("HTTP://EXAMPLE.COM"));
    }
}
