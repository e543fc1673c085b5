//! Clipboard history for clipboard sync mode.
//!
//! The history is newest-first, capped at
//! [`crate::CLIPBOARD_HISTORY_CAPACITY`] entries, and never holds the same
//! text twice in a row. It outlives individual sessions.
//!
//! - [`access`] - Direct OS clipboard access through `arboard`

use std::collections::VecDeque;

use crate::backend::Backend;
use crate::error::Result;

pub mod access;

/// Default number of characters shown for a history entry.
pub const PREVIEW_CHARS: usize = 200;

/// Deduplicated, capped log of clipboard snapshots.
#[derive(Debug, Clone)]
pub struct ClipboardHistoryStore {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for ClipboardHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardHistoryStore {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(crate::CLIPBOARD_HISTORY_CAPACITY),
            capacity: crate::CLIPBOARD_HISTORY_CAPACITY,
        }
    }

    /// Replace the history with entries recorded elsewhere, newest first.
    ///
    /// The seed is taken as-is, without deduplication.
    pub fn seed(&mut self, entries: impl IntoIterator<Item = String>) {
        self.entries = entries.into_iter().take(self.capacity).collect();
        tracing::debug!(count = self.entries.len(), "Seeded clipboard history");
    }

    /// Record a new snapshot.
    ///
    /// Returns `false` when `text` is empty or equal to the newest entry.
    pub fn record(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.is_empty() || self.head() == Some(text.as_str()) {
            return false;
        }

        self.entries.push_front(text);
        self.entries.truncate(self.capacity);
        true
    }

    /// Newest entry.
    pub fn head(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    /// Entry at `index`, 0 being the newest.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Entries as an owned list, newest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put `text` on the system clipboard. The history itself is untouched.
    pub async fn copy_to_system<B>(&self, backend: &B, text: &str) -> Result<()>
    where
        B: Backend + ?Sized,
    {
        backend.set_system_clipboard_text(text).await
    }
}

/// Shorten `text` to at most `limit` characters, ending in `...` when cut.
pub fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(3);
    let mut shortened: String = text.chars().take(keep).collect();
    shortened.push_str("...");
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_deduplication() {
        let mut history = ClipboardHistoryStore::new();
        assert!(history.record("x"));
        assert!(!history.record("x"));
        assert!(history.record("y"));

        assert_eq!(history.to_vec(), vec!["y", "x"]);
    }

    #[test]
    fn test_non_adjacent_repeats_are_kept() {
        let mut history = ClipboardHistoryStore::new();
        history.record("x");
        history.record("y");
        history.record("x");

        assert_eq!(history.to_vec(), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = ClipboardHistoryStore::new();
        for i in 0..60 {
            history.record(format!("clip {i}"));
        }

        assert_eq!(history.len(), crate::CLIPBOARD_HISTORY_CAPACITY);
        assert_eq!(history.head(), Some("clip 59"));
        assert_eq!(history.get(49), Some("clip 10"));
        assert!(!history.iter().any(|e| e == "clip 9"));
    }

    #[test]
    fn test_no_adjacent_duplicates_for_any_sequence() {
        let mut history = ClipboardHistoryStore::new();
        let inputs = ["a", "a", "b", "b", "a", "c", "c", "c", "a", "a", "b"];
        for input in inputs.iter().cycle().take(200) {
            history.record(*input);
        }

        let entries = history.to_vec();
        assert!(entries.len() <= crate::CLIPBOARD_HISTORY_CAPACITY);
        assert!(entries.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_empty_text_ignored() {
        let mut history = ClipboardHistoryStore::new();
        assert!(!history.record(""));
        assert!(history.is_empty());
    }

    #[test]
    fn test_seed_is_trusted_as_is() {
        let mut history = ClipboardHistoryStore::new();
        history.record("old");
        history.seed(vec!["b".to_string(), "b".to_string(), "a".to_string()]);

        assert_eq!(history.to_vec(), vec!["b", "b", "a"]);
        assert!(!history.record("b"));
        assert!(history.record("c"));
        assert_eq!(history.head(), Some("c"));
    }

    #[test]
    fn test_seed_truncated_to_capacity() {
        let mut history = ClipboardHistoryStore::new();
        history.seed((0..80).map(|i| i.to_string()));
        assert_eq!(history.len(), crate::CLIPBOARD_HISTORY_CAPACITY);
        assert_eq!(history.head(), Some("0"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghijkl", 8), "abcde...");
        assert_eq!(preview(&"é".repeat(300), PREVIEW_CHARS).chars().count(), PREVIEW_CHARS);
    }
}
