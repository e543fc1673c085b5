//! Files chosen for a send session.

use crate::navigator::DirectoryEntry;

/// Insertion-ordered set of selected file paths.
///
/// Directories are never selectable, so the set only ever holds file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    paths: Vec<String>,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `entry`. Directories are ignored.
    ///
    /// Returns whether the entry is selected afterwards.
    pub fn toggle(&mut self, entry: &DirectoryEntry) -> bool {
        if entry.is_directory() {
            return false;
        }

        if let Some(pos) = self.paths.iter().position(|p| *p == entry.full_path) {
            self.paths.remove(pos);
            false
        } else {
            self.paths.push(entry.full_path.clone());
            true
        }
    }

    /// Remove `path` if present. Returns whether anything was removed.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    /// Whether `path` is selected.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Selected paths in the order they were picked.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drop every selection.
    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut selection = SelectionSet::new();
        let entry = DirectoryEntry::file("a.txt", "/tmp/a.txt", Some(1));

        assert!(selection.toggle(&entry));
        assert!(selection.contains("/tmp/a.txt"));

        assert!(!selection.toggle(&entry));
        assert!(!selection.contains("/tmp/a.txt"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_directory_is_noop() {
        let mut selection = SelectionSet::new();
        let dir = DirectoryEntry::folder("docs", "/tmp/docs");

        assert!(!selection.toggle(&dir));
        assert!(!selection.toggle(&dir));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut selection = SelectionSet::new();
        for name in ["c", "a", "b"] {
            selection.toggle(&DirectoryEntry::file(name, format!("/tmp/{name}"), None));
        }
        selection.toggle(&DirectoryEntry::file("a", "/tmp/a", None));

        assert_eq!(selection.paths(), ["/tmp/c", "/tmp/b"]);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut selection = SelectionSet::new();
        selection.toggle(&DirectoryEntry::file("a", "/tmp/a", None));

        assert!(selection.remove("/tmp/a"));
        assert!(!selection.remove("/tmp/a"));
        assert!(selection.is_empty());
    }
}
