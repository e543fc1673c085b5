//! Directory browsing for picking files to send.
//!
//! [`PathNavigator`] keeps one listing and the path it came from. A new
//! listing only replaces the old one once it has been fetched and sorted, so
//! a failed load leaves the previous listing on screen.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::backend::DirectoryLister;
use crate::error::Result;

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file (or anything that is not a directory)
    File,
    /// Directory
    Folder,
}

/// A single entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// Display name
    pub name: String,
    /// Path used to navigate into or select the entry
    pub full_path: String,
    /// File or folder
    pub kind: EntryKind,
    /// Size in bytes; `None` for folders or when unknown
    pub size: Option<u64>,
}

impl DirectoryEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>, full_path: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            kind: EntryKind::File,
            size,
        }
    }

    /// Create a folder entry.
    pub fn folder(name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            kind: EntryKind::Folder,
            size: None,
        }
    }

    /// Whether this entry can be navigated into.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Human-readable size, empty for folders.
    pub fn display_size(&self) -> String {
        self.size.map(format_size).unwrap_or_default()
    }
}

/// Sort a listing: directories first, then case-insensitive by name.
pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(compare_entries);
}

fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    match (a.is_directory(), b.is_directory()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

/// Drop the last segment of `path`.
///
/// The separator is `/` when the path contains one, `\` otherwise. Going
/// above the top yields [`crate::ROOT_PATH`].
pub fn parent_path(path: &str) -> String {
    let separator = if path.contains('/') { '/' } else { '\\' };
    let trimmed = path.trim_end_matches(separator);

    let mut segments: Vec<&str> = trimmed.split(separator).collect();
    segments.pop();
    let parent = segments.join(&separator.to_string());

    if parent.is_empty() {
        crate::ROOT_PATH.to_string()
    } else {
        parent
    }
}

/// Format file size for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Current directory and its sorted listing.
#[derive(Debug, Clone, Default)]
pub struct PathNavigator {
    current_path: String,
    entries: Vec<DirectoryEntry>,
}

impl PathNavigator {
    /// Create an empty navigator; nothing is listed until the first load.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the current listing.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Current listing, sorted.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Find an entry of the current listing by name.
    pub fn entry(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// List `path` and make it current.
    ///
    /// On failure the previous listing and path are kept; the error is logged
    /// and handed back so the caller can surface it.
    pub async fn load_directory<L>(&mut self, lister: &L, path: &str) -> Result<()>
    where
        L: DirectoryLister + ?Sized,
    {
        match lister.read_directory(path).await {
            Ok(mut entries) => {
                sort_entries(&mut entries);
                tracing::debug!(path, count = entries.len(), "Loaded directory");
                self.entries = entries;
                self.current_path = path.to_string();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to load directory, keeping previous listing");
                Err(e)
            }
        }
    }

    /// Enter `entry` if it is a directory. Returns `false` for files.
    pub async fn navigate_into<L>(&mut self, lister: &L, entry: &DirectoryEntry) -> Result<bool>
    where
        L: DirectoryLister + ?Sized,
    {
        if !entry.is_directory() {
            return Ok(false);
        }
        self.load_directory(lister, &entry.full_path).await?;
        Ok(true)
    }

    /// Go to the parent of the current path.
    pub async fn navigate_up<L>(&mut self, lister: &L) -> Result<()>
    where
        L: DirectoryLister + ?Sized,
    {
        let parent = parent_path(&self.current_path);
        self.load_directory(lister, &parent).await
    }

    /// List the current path again.
    pub async fn reload<L>(&mut self, lister: &L) -> Result<()>
    where
        L: DirectoryLister + ?Sized,
    {
        let path = self.current_path.clone();
        self.load_directory(lister, &path).await
    }
}
